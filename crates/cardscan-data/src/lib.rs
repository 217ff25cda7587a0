use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const RANK_PROBES_FILE: &str = "rank_probes.json";
pub const SUIT_PROBES_FILE: &str = "suit_probes.json";

/// A single probe pixel, relative to the top-left corner of a symbol area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    pub label: String,
    pub x: u32,
    pub y: u32,
}

/// Ordered probe list for one symbol kind. Order is the priority used at
/// inference time and must be kept exactly as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeTable {
    pub width: u32,
    pub height: u32,
    pub probes: Vec<Probe>,
}

impl ProbeTable {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            probes: Vec::new(),
        }
    }

    /// Read a table from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let table: ProbeTable = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(table)
    }

    /// Write the table as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize probe table")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn from_points(width: u32, height: u32, points: &[(&str, u32, u32)]) -> Self {
        Self {
            width,
            height,
            probes: points
                .iter()
                .map(|&(label, x, y)| Probe {
                    label: label.to_string(),
                    x,
                    y,
                })
                .collect(),
        }
    }
}

/// Reference tables trained on the default table layout
pub mod reference {
    use super::ProbeTable;

    /// Rank area probes (30x25 area)
    pub fn rank_table() -> ProbeTable {
        ProbeTable::from_points(
            30,
            25,
            &[
                ("10", 1, 3),
                ("Q", 21, 5),
                ("A", 1, 23),
                ("K", 21, 2),
                ("4", 10, 8),
                ("J", 13, 18),
                ("3", 13, 7),
                ("2", 4, 23),
                ("7", 9, 17),
                ("9", 11, 14),
                ("8", 16, 8),
                ("6", 4, 14),
                ("5", 6, 2),
            ],
        )
    }

    /// Suit area probes (30x35 area)
    pub fn suit_table() -> ProbeTable {
        ProbeTable::from_points(30, 35, &[("h", 4, 7), ("c", 9, 4), ("s", 0, 19), ("d", 13, 2)])
    }
}

/// Rank and suit probe tables used together to read a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionTables {
    pub rank: ProbeTable,
    pub suit: ProbeTable,
}

impl Default for DecisionTables {
    fn default() -> Self {
        Self {
            rank: reference::rank_table(),
            suit: reference::suit_table(),
        }
    }
}

impl DecisionTables {
    /// Load probe tables from the data directory.
    /// Missing files fall back to the reference tables.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let rank = load_or_reference(&data_dir.join(RANK_PROBES_FILE), reference::rank_table)?;
        let suit = load_or_reference(&data_dir.join(SUIT_PROBES_FILE), reference::suit_table)?;
        Ok(Self { rank, suit })
    }

    /// Save both tables into the data directory, creating it if needed
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
        self.rank.save(&data_dir.join(RANK_PROBES_FILE))?;
        self.suit.save(&data_dir.join(SUIT_PROBES_FILE))?;
        tracing::info!(
            "Saved {} rank and {} suit probes to {}",
            self.rank.probes.len(),
            self.suit.probes.len(),
            data_dir.display()
        );
        Ok(())
    }
}

fn load_or_reference(path: &Path, fallback: fn() -> ProbeTable) -> Result<ProbeTable> {
    if path.exists() {
        let table = ProbeTable::load(path)?;
        tracing::info!("Loaded {} probes from {}", table.probes.len(), path.display());
        Ok(table)
    } else {
        tracing::warn!(
            "No probe table at {}. Using reference table",
            path.display()
        );
        Ok(fallback())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_nonexistent() {
        let tables = DecisionTables::load(Path::new("/nonexistent")).unwrap();
        assert_eq!(tables, DecisionTables::default());
        assert_eq!(tables.rank.probes.len(), 13);
        assert_eq!(tables.suit.probes.len(), 4);
    }

    #[test]
    fn test_save_and_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut tables = DecisionTables::default();
        tables.suit.probes.reverse();

        tables.save(dir.path()).unwrap();
        let loaded = DecisionTables::load(dir.path()).unwrap();

        assert_eq!(loaded, tables);
        assert_eq!(loaded.suit.probes[0].label, "d");
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(RANK_PROBES_FILE), "not json").unwrap();
        assert!(DecisionTables::load(dir.path()).is_err());
    }

    #[test]
    fn test_reference_probes_inside_area() {
        for table in [reference::rank_table(), reference::suit_table()] {
            for probe in &table.probes {
                assert!(probe.x < table.width && probe.y < table.height);
            }
        }
    }
}
