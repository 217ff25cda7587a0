use crate::error::TrainError;
use crate::mask::{MaskShape, PixelMask};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Pixels that are always ink (`mandatory`) and ever ink (`probable`)
/// across the samples of one class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSignature {
    pub mandatory: BTreeSet<usize>,
    pub probable: BTreeSet<usize>,
}

impl ClassSignature {
    /// Seed from a single sample: both sets are its ink pixels
    pub fn seed(mask: &PixelMask) -> Self {
        let ink: BTreeSet<usize> = mask.ink_indices().collect();
        Self {
            mandatory: ink.clone(),
            probable: ink,
        }
    }

    /// Fold one more sample in
    pub fn fold(mut self, mask: &PixelMask) -> Self {
        self.mandatory.retain(|&i| mask.is_ink(i));
        self.probable.extend(mask.ink_indices());
        self
    }
}

/// Signatures of every class of one symbol kind, over a shared mask shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureSet {
    pub shape: MaskShape,
    pub classes: BTreeMap<String, ClassSignature>,
}

impl SignatureSet {
    pub fn new(shape: MaskShape) -> Self {
        Self {
            shape,
            classes: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, label: impl Into<String>, signature: ClassSignature) {
        self.classes.insert(label.into(), signature);
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Aggregate labeled masks into per-class signatures.
pub fn aggregate<I>(samples: I) -> Result<SignatureSet, TrainError>
where
    I: IntoIterator<Item = (String, PixelMask)>,
{
    let mut groups: BTreeMap<String, Vec<PixelMask>> = BTreeMap::new();
    for (label, mask) in samples {
        groups.entry(label).or_default().push(mask);
    }
    aggregate_groups(&groups)
}

/// Aggregate masks already grouped by class.
///
/// Every group must be non-empty and every mask must share the shape of
/// the first one.
pub fn aggregate_groups(groups: &BTreeMap<String, Vec<PixelMask>>) -> Result<SignatureSet, TrainError> {
    let shape = groups
        .values()
        .find_map(|masks| masks.first())
        .map(PixelMask::shape)
        .ok_or(TrainError::NoSamples)?;

    let mut set = SignatureSet::new(shape);
    for (label, masks) in groups {
        let Some((first, rest)) = masks.split_first() else {
            return Err(TrainError::EmptyInput {
                label: label.clone(),
            });
        };

        for mask in masks {
            if mask.shape() != shape {
                return Err(TrainError::ShapeMismatch {
                    label: label.clone(),
                    expected: shape,
                    actual: mask.shape(),
                });
            }
        }

        let signature = rest
            .iter()
            .fold(ClassSignature::seed(first), ClassSignature::fold);
        debug!(
            "'{}': {} sample(s), {} mandatory, {} probable",
            label,
            masks.len(),
            signature.mandatory.len(),
            signature.probable.len()
        );
        set.insert(label.clone(), signature);
    }

    Ok(set)
}
