//! Inference module
//!
//! The prediction endpoint's pipeline, independent of any web framework:
//! - Form field validation and numeric parsing
//! - Feature encoding against the artifact store
//! - Model invocation and rounding to 3 decimals
//! - Rendering of success or failure as a display string

mod engine;
mod form;

pub use engine::{Prediction, PredictionEngine, PredictionOutcome};
pub use form::{FieldKind, FormField, FormFields, FORM_FIELDS};
