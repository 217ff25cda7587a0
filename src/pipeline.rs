use anyhow::{Context, Result};
use cardscan_capture::TableLayout;
use cardscan_data::DecisionTables;
use cardscan_state::Hand;
use cardscan_vision::{CardReader, DecisionSequence, TemplateMatcher};
use clap::ValueEnum;
use image::RgbaImage;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Which recognizer reads the symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MatcherKind {
    /// Learned probe pixels
    Probe,
    /// Averaged sample templates
    Template,
}

/// Cards read from one screenshot
#[derive(Debug, Clone, Serialize)]
pub struct Recognition {
    pub file: PathBuf,
    pub hand: Hand,
}

impl Recognition {
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// The hand the file name claims, e.g. `10hQs` for `10hQs.png`
    pub fn expected(&self) -> String {
        self.file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn is_expected(&self) -> bool {
        self.hand.to_string() == self.expected()
    }
}

/// Screenshot → hand recognition with the configured recognizer
pub enum Pipeline {
    Probe(CardReader<DecisionSequence, DecisionSequence>),
    Template(CardReader<TemplateMatcher, TemplateMatcher>),
}

impl Pipeline {
    /// Load layout and recognizer data from the data directory
    pub fn load(data_dir: &Path, kind: MatcherKind) -> Result<Self> {
        let layout = TableLayout::load_or_default(data_dir)?;

        let pipeline = match kind {
            MatcherKind::Probe => {
                let tables = DecisionTables::load(data_dir)?;
                let ranks = DecisionSequence::from_probe_table(&tables.rank)
                    .context("Invalid rank probe table")?;
                let suits = DecisionSequence::from_probe_table(&tables.suit)
                    .context("Invalid suit probe table")?;
                Self::Probe(CardReader::new(layout, ranks, suits))
            }
            MatcherKind::Template => {
                let templates_dir = data_dir.join(crate::commands::TEMPLATES_DIR);
                let ranks = TemplateMatcher::load(&templates_dir.join("ranks"))?;
                let suits = TemplateMatcher::load(&templates_dir.join("suits"))?;
                if ranks.template_count() == 0 || suits.template_count() == 0 {
                    warn!("Template set is incomplete. Run `cardscan templates` first");
                }
                Self::Template(CardReader::new(layout, ranks, suits))
            }
        };

        info!("Recognition pipeline ready ({:?} matcher)", kind);
        Ok(pipeline)
    }

    pub fn read_hand(&self, frame: &RgbaImage) -> Result<Hand> {
        match self {
            Self::Probe(reader) => reader.read_hand(frame),
            Self::Template(reader) => reader.read_hand(frame),
        }
    }

    /// Read every screenshot in `dir`, in file name order, reporting each
    /// result through `on_recognized` as it is produced.
    pub fn recognize_dir(
        &self,
        dir: &Path,
        mut on_recognized: impl FnMut(&Recognition),
    ) -> Result<Vec<Recognition>> {
        let mut results = Vec::new();
        for file in cardscan_capture::list_screenshots(dir)? {
            let frame = cardscan_capture::load_screenshot(&file)?;
            let hand = self
                .read_hand(&frame)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            debug!("{} -> {}", file.display(), hand);

            let recognition = Recognition { file, hand };
            on_recognized(&recognition);
            results.push(recognition);
        }
        Ok(results)
    }
}
