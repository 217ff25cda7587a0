//! Probe selection.
//!
//! Picks, one class at a time, a pixel that is ink in every sample of that
//! class and in no sample of any class still waiting to be resolved. Each
//! resolved class drops out of the competition, so later classes only need
//! to be told apart from the ones after them. At inference the probes are
//! tried in the same order and the first that fires wins.

use crate::classifier::{DecisionEntry, DecisionSequence};
use crate::error::TrainError;
use crate::mask::MaskShape;
use crate::signature::SignatureSet;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Pixels of `label` that are always ink for it and never ink for any
/// other class in `remaining`.
fn unique_pixels(set: &SignatureSet, remaining: &BTreeSet<&str>, label: &str) -> BTreeSet<usize> {
    let Some(own) = set.classes.get(label) else {
        return BTreeSet::new();
    };

    let mut unique = own.mandatory.clone();
    for other in remaining.iter().filter(|&&o| o != label) {
        if let Some(signature) = set.classes.get(*other) {
            unique.retain(|i| !signature.probable.contains(i));
        }
    }
    unique
}

/// Keep only pixels that have a horizontal neighbour in the set.
/// A pixel at the end of a row does not touch the first pixel of the next.
fn run_pixels(shape: MaskShape, pixels: &BTreeSet<usize>) -> BTreeSet<usize> {
    pixels
        .iter()
        .copied()
        .filter(|&i| {
            let left = i > 0 && !shape.ends_row(i - 1) && pixels.contains(&(i - 1));
            let right = !shape.ends_row(i) && pixels.contains(&(i + 1));
            left || right
        })
        .collect()
}

/// The class with the most candidate pixels, lowest label on ties.
fn best_class<'a, 'm>(
    candidates: &'m BTreeMap<&'a str, BTreeSet<usize>>,
) -> Option<(&'a str, &'m BTreeSet<usize>)> {
    let mut best: Option<(&'a str, &'m BTreeSet<usize>)> = None;
    for (&label, pixels) in candidates {
        // BTreeMap iterates in ascending label order, so only a strictly
        // larger set may replace the current best.
        if best.map_or(true, |(_, b)| pixels.len() > b.len()) {
            best = Some((label, pixels));
        }
    }
    best
}

/// Select one probe per class.
///
/// With `prefer_runs`, only pixels that sit in a horizontal run of at least
/// two candidate pixels are considered. The first time no class has such a
/// pixel, run preference is dropped for the rest of the selection.
pub fn select(set: &SignatureSet, prefer_runs: bool) -> Result<DecisionSequence, TrainError> {
    let mut remaining: BTreeSet<&str> = set.classes.keys().map(String::as_str).collect();
    let mut entries = Vec::with_capacity(remaining.len());
    let mut prefer_runs = prefer_runs;

    while !remaining.is_empty() {
        let candidates: BTreeMap<&str, BTreeSet<usize>> = remaining
            .iter()
            .map(|&label| {
                let unique = unique_pixels(set, &remaining, label);
                let pixels = if prefer_runs {
                    run_pixels(set.shape, &unique)
                } else {
                    unique
                };
                (label, pixels)
            })
            .collect();

        let picked = best_class(&candidates)
            .and_then(|(label, pixels)| pixels.first().map(|&index| (label, index, pixels.len())));

        let Some((label, index, count)) = picked else {
            if prefer_runs {
                warn!(
                    "No run of unique pixels among {} class(es), relaxing to single pixels",
                    remaining.len()
                );
                prefer_runs = false;
                continue;
            }
            return Err(TrainError::Unresolvable {
                classes: remaining.iter().map(|s| s.to_string()).collect(),
            });
        };

        let (x, y) = set.shape.coords(index);
        debug!(
            "'{}' -> ({}, {}) from {} candidate pixel(s)",
            label, x, y, count
        );

        entries.push(DecisionEntry {
            label: label.to_string(),
            index,
        });
        remaining.remove(label);
    }

    let sequence = DecisionSequence::new(set.shape, entries);
    info!(
        "Selected {} probe(s) over {} area",
        sequence.len(),
        set.shape
    );
    Ok(sequence)
}
