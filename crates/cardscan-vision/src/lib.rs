mod card_reader;
mod classifier;
mod error;
mod mask;
mod selector;
mod signature;
mod template_matcher;
mod training;

pub use card_reader::CardReader;
pub use classifier::{DecisionEntry, DecisionSequence, SymbolRecognizer};
pub use error::TrainError;
pub use mask::{probe_ink, MaskShape, PixelMask};
pub use selector::select;
pub use signature::{aggregate, aggregate_groups, ClassSignature, SignatureSet};
pub use template_matcher::{MatchResult, TemplateMatcher};
pub use training::TrainingSet;
