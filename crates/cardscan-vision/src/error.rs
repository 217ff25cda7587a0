use crate::mask::MaskShape;
use thiserror::Error;

/// Errors raised while learning probe tables from samples
#[derive(Debug, Error)]
pub enum TrainError {
    /// No masks were supplied at all
    #[error("no training samples")]
    NoSamples,

    /// A class was listed without any samples
    #[error("no training samples for {label}")]
    EmptyInput { label: String },

    /// Masks of the same symbol kind must share one size
    #[error("mask for '{label}' is {actual}, expected {expected}")]
    ShapeMismatch {
        label: String,
        expected: MaskShape,
        actual: MaskShape,
    },

    /// Neither run-preferring nor relaxed selection found a unique probe
    #[error("no unique probe pixel for any of: {}", classes.join(", "))]
    Unresolvable { classes: Vec<String> },
}
