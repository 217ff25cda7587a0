use anyhow::{bail, Context, Result};
use cardscan_capture::{crop_region, TableLayout};
use cardscan_data::DecisionTables;
use cardscan_state::Hand;
use image::RgbaImage;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::mask::PixelMask;
use crate::selector::select;
use crate::signature::aggregate;
use crate::template_matcher::TemplateMatcher;

/// Labeled rank and suit crops cut from training screenshots
pub struct TrainingSet {
    layout: TableLayout,
    ranks: Vec<(String, RgbaImage)>,
    suits: Vec<(String, RgbaImage)>,
}

impl TrainingSet {
    pub fn new(layout: TableLayout) -> Self {
        Self {
            layout,
            ranks: Vec::new(),
            suits: Vec::new(),
        }
    }

    /// Collect samples from every `.png` in `dir`. Each file name (without
    /// extension) lists the cards shown, e.g. `10hQsAd.png`.
    pub fn from_dir(dir: &Path, layout: TableLayout) -> Result<Self> {
        let mut set = Self::new(layout);

        for path in cardscan_capture::list_screenshots(dir)? {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let hand = Hand::parse(&stem)
                .with_context(|| format!("Bad card list in file name {}", path.display()))?;
            let frame = cardscan_capture::load_screenshot(&path)?;
            set.add_screenshot(&frame, &hand)
                .with_context(|| format!("Failed to sample {}", path.display()))?;
        }

        info!(
            "Collected {} rank and {} suit sample(s) from {}",
            set.ranks.len(),
            set.suits.len(),
            dir.display()
        );
        Ok(set)
    }

    /// Crop the rank and suit areas of every card in `hand`
    pub fn add_screenshot(&mut self, frame: &RgbaImage, hand: &Hand) -> Result<()> {
        if hand.len() > self.layout.slot_count() {
            bail!(
                "{} cards listed but the table has {} slots",
                hand.len(),
                self.layout.slot_count()
            );
        }
        self.layout.check_frame(frame)?;

        for (slot, card) in hand.cards.iter().enumerate() {
            let (Some(rank_area), Some(suit_area)) =
                (self.layout.rank_region(slot), self.layout.suit_region(slot))
            else {
                break;
            };
            debug!("Slot {}: sampling {}", slot, card);
            self.ranks
                .push((card.rank.clone(), crop_region(frame, &rank_area)));
            self.suits
                .push((card.suit.clone(), crop_region(frame, &suit_area)));
        }
        Ok(())
    }

    pub fn rank_sample_count(&self) -> usize {
        self.ranks.len()
    }

    pub fn suit_sample_count(&self) -> usize {
        self.suits.len()
    }

    pub fn rank_masks(&self) -> Vec<(String, PixelMask)> {
        to_masks(&self.ranks, self.layout.ink_threshold)
    }

    pub fn suit_masks(&self) -> Vec<(String, PixelMask)> {
        to_masks(&self.suits, self.layout.ink_threshold)
    }

    /// Learn rank and suit probe tables
    pub fn train(&self, prefer_runs: bool) -> Result<DecisionTables> {
        let rank_signatures = aggregate(self.rank_masks()).context("Failed to aggregate ranks")?;
        let rank = select(&rank_signatures, prefer_runs).context("Failed to select rank probes")?;

        let suit_signatures = aggregate(self.suit_masks()).context("Failed to aggregate suits")?;
        let suit = select(&suit_signatures, prefer_runs).context("Failed to select suit probes")?;

        Ok(DecisionTables {
            rank: rank.to_probe_table(),
            suit: suit.to_probe_table(),
        })
    }

    /// Averaged templates for ranks and suits
    pub fn templates(&self) -> (TemplateMatcher, TemplateMatcher) {
        (
            TemplateMatcher::from_samples(&group(&self.ranks)),
            TemplateMatcher::from_samples(&group(&self.suits)),
        )
    }
}

fn to_masks(samples: &[(String, RgbaImage)], threshold: u8) -> Vec<(String, PixelMask)> {
    samples
        .iter()
        .map(|(label, crop)| (label.clone(), PixelMask::from_rgba(crop, threshold)))
        .collect()
}

fn group(samples: &[(String, RgbaImage)]) -> BTreeMap<String, Vec<RgbaImage>> {
    let mut groups: BTreeMap<String, Vec<RgbaImage>> = BTreeMap::new();
    for (label, crop) in samples {
        groups.entry(label.clone()).or_default().push(crop.clone());
    }
    groups
}
