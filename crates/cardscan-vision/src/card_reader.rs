use anyhow::Result;
use cardscan_capture::TableLayout;
use cardscan_state::{Card, Hand};
use image::RgbaImage;
use tracing::debug;

use crate::classifier::SymbolRecognizer;
use crate::mask::probe_ink;

/// Reads the cards on the table, slot by slot, with one recognizer for
/// ranks and one for suits.
pub struct CardReader<R, S> {
    layout: TableLayout,
    ranks: R,
    suits: S,
}

impl<R: SymbolRecognizer, S: SymbolRecognizer> CardReader<R, S> {
    pub fn new(layout: TableLayout, ranks: R, suits: S) -> Self {
        Self {
            layout,
            ranks,
            suits,
        }
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// True when the slot shows table background instead of a card
    pub fn is_empty_slot(&self, frame: &RgbaImage, slot: usize) -> bool {
        match self.layout.background_point(slot) {
            Some(p) => probe_ink(frame, p.x, p.y, self.layout.ink_threshold),
            None => true,
        }
    }

    /// Read cards left to right, stopping at the first empty slot.
    /// Unrecognized symbols are left as empty text. Fails when the frame is
    /// too small for the table layout.
    pub fn read_hand(&self, frame: &RgbaImage) -> Result<Hand> {
        self.layout.check_frame(frame)?;
        let threshold = self.layout.ink_threshold;
        let mut hand = Hand::new();

        for slot in 0..self.layout.slot_count() {
            if self.is_empty_slot(frame, slot) {
                debug!("Slot {} is empty", slot);
                break;
            }
            let (Some(rank_area), Some(suit_area)) =
                (self.layout.rank_region(slot), self.layout.suit_region(slot))
            else {
                break;
            };

            let rank = self.ranks.recognize(frame, &rank_area, threshold);
            let suit = self.suits.recognize(frame, &suit_area, threshold);
            debug!("Slot {}: rank {:?}, suit {:?}", slot, rank, suit);

            hand.cards
                .push(Card::new(rank.unwrap_or_default(), suit.unwrap_or_default()));
        }

        Ok(hand)
    }
}
