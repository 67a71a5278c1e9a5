//! Trained predictor module
//!
//! Holds the fitted regression models the service can serve:
//! - Decision trees
//! - Random Forests (mean of trees)
//!
//! Models arrive as JSON documents tagged with their `type`; each tree is a
//! set of flat per-node arrays.

pub mod decision_tree;
pub mod random_forest;

pub use decision_tree::{DecisionTree, TreeArrays, TreeNode};
pub use random_forest::RandomForest;

use crate::error::Result;
use crate::utils::read_json;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inference contract shared by every served model
pub trait Predictor: Send + Sync + std::fmt::Debug {
    /// Predict one value per row of `x`
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Feature count the model was fitted on, when the artifact records it
    fn n_features(&self) -> Option<usize>;

    /// Short human-readable description for startup logs
    fn describe(&self) -> String;
}

/// Serialized model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelArtifact {
    RandomForest(RandomForest),
    DecisionTree(DecisionTree),
}

impl ModelArtifact {
    /// Load a model artifact from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path)
    }

    /// Highest feature index the model reads
    pub fn max_feature_idx(&self) -> Option<usize> {
        match self {
            ModelArtifact::RandomForest(forest) => forest.max_feature_idx(),
            ModelArtifact::DecisionTree(tree) => tree.max_feature_idx(),
        }
    }
}

impl Predictor for ModelArtifact {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            ModelArtifact::RandomForest(forest) => forest.predict(x),
            ModelArtifact::DecisionTree(tree) => tree.predict(x),
        }
    }

    fn n_features(&self) -> Option<usize> {
        match self {
            ModelArtifact::RandomForest(forest) => forest.n_features(),
            ModelArtifact::DecisionTree(tree) => tree.n_features(),
        }
    }

    fn describe(&self) -> String {
        match self {
            ModelArtifact::RandomForest(forest) => format!(
                "random forest ({} trees, max depth {})",
                forest.n_trees(),
                forest.max_depth()
            ),
            ModelArtifact::DecisionTree(tree) => format!(
                "decision tree (depth {}, {} leaves)",
                tree.get_depth(),
                tree.get_n_leaves()
            ),
        }
    }
}
