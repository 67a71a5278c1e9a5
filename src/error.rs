//! Error types for the sales prediction service

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, SalesError>;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum SalesError {
    #[error("missing form field '{0}'")]
    MissingField(String),

    #[error("could not convert {field} to a number: '{value}'")]
    InvalidNumber { field: String, value: String },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Prediction error: {0}")]
    Prediction(String),

    #[error("Invalid artifact {path}: {reason}")]
    Artifact { path: PathBuf, reason: String },

    #[error("Artifacts do not fit together: {0}")]
    Mismatch(String),

    #[error("Download of '{identifier}' failed: {reason}")]
    Download { identifier: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SalesError {
    fn from(err: serde_json::Error) -> Self {
        SalesError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for SalesError {
    fn from(err: ndarray::ShapeError) -> Self {
        SalesError::Prediction(err.to_string())
    }
}
