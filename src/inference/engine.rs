//! Prediction pipeline: form -> record -> feature vector -> model -> rounded value

use crate::artifacts::ArtifactStore;
use crate::error::{Result, SalesError};
use crate::preprocessing::RawRecord;
use super::FormFields;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Predicted global sales in millions of units, rounded to 3 decimals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction(f64);

impl Prediction {
    /// Round a raw model output; non-finite outputs are rejected
    pub fn from_raw(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(SalesError::Prediction(format!(
                "model produced a non-finite value ({})",
                value
            )));
        }
        Ok(Self(round_to_3(value)))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

// Decimal formatting rounds the exact binary value, half to even
fn round_to_3(value: f64) -> f64 {
    format!("{:.3}", value).parse().unwrap_or(value)
}

/// What the endpoint shows the user
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Success(Prediction),
    Failure(String),
}

impl From<Result<Prediction>> for PredictionOutcome {
    fn from(result: Result<Prediction>) -> Self {
        match result {
            Ok(prediction) => PredictionOutcome::Success(prediction),
            Err(e) => PredictionOutcome::Failure(e.to_string()),
        }
    }
}

impl fmt::Display for PredictionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionOutcome::Success(prediction) => {
                write!(f, "Predicted Global Sales: {} million units", prediction)
            }
            PredictionOutcome::Failure(message) => write!(f, "Error: {}", message),
        }
    }
}

/// Runs predictions against a shared, read-only artifact store
#[derive(Debug, Clone)]
pub struct PredictionEngine {
    store: Arc<ArtifactStore>,
}

impl PredictionEngine {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Encode a record and run the predictor on it
    pub fn predict_record(&self, record: &RawRecord) -> Result<Prediction> {
        let start = Instant::now();

        let vector = self.store.feature_encoder().encode(record)?;
        let x = vector.to_row_matrix()?;
        let output = self.store.predictor().predict(&x)?;
        let raw = output
            .first()
            .copied()
            .ok_or_else(|| SalesError::Prediction("model returned no output".to_string()))?;
        let prediction = Prediction::from_raw(raw)?;

        debug!(
            raw,
            rounded = prediction.value(),
            latency_us = start.elapsed().as_micros() as u64,
            "Prediction complete"
        );
        Ok(prediction)
    }

    /// Full pipeline from submitted form fields
    pub fn predict_form(&self, form: &FormFields) -> Result<Prediction> {
        let record = form.to_record()?;
        self.predict_record(&record)
    }

    /// Run the pipeline and turn any failure into a displayable outcome
    pub fn respond(&self, form: &FormFields) -> PredictionOutcome {
        let result = self.predict_form(form);
        if let Err(ref e) = result {
            warn!(error = %e, "Prediction request failed");
        }
        result.into()
    }
}
