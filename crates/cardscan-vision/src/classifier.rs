use anyhow::{bail, Result};
use cardscan_capture::PixelRegion;
use cardscan_data::{Probe, ProbeTable};
use image::RgbaImage;

use crate::mask::{probe_ink, MaskShape, PixelMask};

/// Reads one symbol kind (rank or suit) from a screenshot area.
pub trait SymbolRecognizer {
    /// Label of the symbol in `region`, or None when nothing matches
    fn recognize(&self, frame: &RgbaImage, region: &PixelRegion, threshold: u8) -> Option<String>;
}

/// One probe: the class it detects and its pixel index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionEntry {
    pub label: String,
    pub index: usize,
}

/// Probes in selection order. The first probe that lands on ink decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionSequence {
    shape: MaskShape,
    entries: Vec<DecisionEntry>,
}

impl DecisionSequence {
    pub fn new(shape: MaskShape, entries: Vec<DecisionEntry>) -> Self {
        Self { shape, entries }
    }

    pub fn shape(&self) -> MaskShape {
        self.shape
    }

    pub fn entries(&self) -> &[DecisionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Class of the first probe that is ink in `mask`
    pub fn classify(&self, mask: &PixelMask) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| mask.is_ink(e.index))
            .map(|e| e.label.as_str())
    }

    /// Same as `classify`, probing the screenshot directly instead of
    /// building a mask of the whole area first.
    pub fn classify_region(&self, frame: &RgbaImage, region: &PixelRegion, threshold: u8) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| {
                let (x, y) = self.shape.coords(e.index);
                probe_ink(frame, region.x + x, region.y + y, threshold)
            })
            .map(|e| e.label.as_str())
    }

    /// Serializable `(label, x, y)` form
    pub fn to_probe_table(&self) -> ProbeTable {
        let probes = self
            .entries
            .iter()
            .map(|e| {
                let (x, y) = self.shape.coords(e.index);
                Probe {
                    label: e.label.clone(),
                    x,
                    y,
                }
            })
            .collect();
        ProbeTable {
            width: self.shape.width,
            height: self.shape.height,
            probes,
        }
    }

    pub fn from_probe_table(table: &ProbeTable) -> Result<Self> {
        let shape = MaskShape::new(table.width, table.height);
        let mut entries = Vec::with_capacity(table.probes.len());
        for probe in &table.probes {
            if probe.x >= table.width || probe.y >= table.height {
                bail!(
                    "Probe for '{}' at ({}, {}) is outside the {} area",
                    probe.label,
                    probe.x,
                    probe.y,
                    shape
                );
            }
            entries.push(DecisionEntry {
                label: probe.label.clone(),
                index: shape.index(probe.x, probe.y),
            });
        }
        Ok(Self { shape, entries })
    }
}

impl SymbolRecognizer for DecisionSequence {
    fn recognize(&self, frame: &RgbaImage, region: &PixelRegion, threshold: u8) -> Option<String> {
        self.classify_region(frame, region, threshold)
            .map(str::to_string)
    }
}
