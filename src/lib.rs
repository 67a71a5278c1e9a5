//! vgsales - Video game global sales prediction
//!
//! A small web front-end around a pre-trained tree-ensemble regressor:
//! - Artifact provisioning (download-if-missing) and loading
//! - Categorical label encoding into a fixed feature order
//! - Tree and forest evaluation
//! - HTML form server and CLI
//!
//! # Modules
//!
//! ## Core
//! - [`artifacts`] - Provision and load the model, encoders and feature order
//! - [`model`] - Decision tree and random forest predictors
//! - [`preprocessing`] - Raw records, label encoders, feature vectors
//! - [`inference`] - Form parsing and prediction outcomes
//!
//! ## Services
//! - [`server`] - HTTP server with the prediction form
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core modules
pub mod artifacts;
pub mod model;
pub mod preprocessing;
pub mod inference;

// Utilities
pub mod utils;

// Services
pub mod server;
pub mod cli;

pub use error::{Result, SalesError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, SalesError};

    // Artifacts
    pub use crate::artifacts::{ArtifactConfig, ArtifactPaths, ArtifactStore, RemoteStore};

    // Model
    pub use crate::model::{DecisionTree, ModelArtifact, Predictor, RandomForest, TreeNode};

    // Preprocessing
    pub use crate::preprocessing::{
        EncoderTable, FeatureOrder, FeatureVector, LabelEncoder, RawRecord, RawValue,
    };

    // Inference
    pub use crate::inference::{FormFields, Prediction, PredictionEngine, PredictionOutcome};

    // Server
    pub use crate::server::{create_router, run_server, AppState, ServerConfig};
}
