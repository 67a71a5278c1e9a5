//! Data preprocessing module
//!
//! Turns raw request records into the numeric input the predictor expects:
//! - Label encoding of categorical columns with a fallback for unseen labels
//! - Reordering to the feature order used at training time

mod encoder;
mod features;

pub use encoder::{ClassLabel, EncoderTable, LabelEncoder, LabelEncoderRepr};
pub use features::{encode, FeatureEncoder, FeatureOrder, FeatureVector, RawRecord, RawValue};
