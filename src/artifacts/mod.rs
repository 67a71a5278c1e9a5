//! Artifact provisioning and the read-only artifact store
//!
//! The store is built once at startup from three files:
//! - the trained predictor
//! - the categorical encoder table
//! - the feature order the predictor was trained on
//!
//! Missing files are fetched from the remote store first.

mod config;
pub mod provision;

pub use config::{
    ArtifactConfig, ArtifactPaths, ENCODERS_FILE, ENCODERS_ID, FEATURES_FILE, FEATURES_ID,
    MODEL_FILE, MODEL_ID,
};
pub use provision::{RemoteStore, DEFAULT_DOWNLOAD_URL};

use crate::error::{Result, SalesError};
use crate::model::{ModelArtifact, Predictor};
use crate::preprocessing::{EncoderTable, FeatureEncoder, FeatureOrder};
use tracing::info;

/// Immutable artifacts shared by every request
#[derive(Debug)]
pub struct ArtifactStore {
    predictor: Box<dyn Predictor>,
    encoders: EncoderTable,
    feature_order: FeatureOrder,
}

impl ArtifactStore {
    /// Assemble a store from in-memory artifacts
    pub fn new(
        predictor: impl Predictor + 'static,
        encoders: EncoderTable,
        feature_order: FeatureOrder,
    ) -> Result<Self> {
        if let Some(n_features) = predictor.n_features() {
            if n_features != feature_order.len() {
                return Err(SalesError::Mismatch(format!(
                    "model expects {} features but the feature order lists {}",
                    n_features,
                    feature_order.len()
                )));
            }
        }

        Ok(Self {
            predictor: Box::new(predictor),
            encoders,
            feature_order,
        })
    }

    /// Deserialize the three artifact files
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let model = ModelArtifact::load(&paths.model)?;
        let encoders = EncoderTable::load(&paths.encoders)?;
        let feature_order = FeatureOrder::load(&paths.features)?;

        if let Some(max_idx) = model.max_feature_idx() {
            if max_idx >= feature_order.len() {
                return Err(SalesError::Artifact {
                    path: paths.model.clone(),
                    reason: format!(
                        "model splits on feature index {} but only {} features are listed",
                        max_idx,
                        feature_order.len()
                    ),
                });
            }
        }

        let store = Self::new(model, encoders, feature_order)?;
        info!(
            model = %store.predictor.describe(),
            encoders = store.encoders.len(),
            features = store.feature_order.len(),
            "Artifacts loaded"
        );
        Ok(store)
    }

    /// Fetch any missing artifact files, then load them
    pub async fn provision_and_load(config: &ArtifactConfig) -> Result<Self> {
        let remote = RemoteStore::new(&config.download_base_url)?;
        for (identifier, path) in config.sources() {
            remote.ensure_local(identifier, &path).await?;
        }
        Self::load(&config.paths())
    }

    pub fn predictor(&self) -> &dyn Predictor {
        self.predictor.as_ref()
    }

    pub fn encoders(&self) -> &EncoderTable {
        &self.encoders
    }

    pub fn feature_order(&self) -> &FeatureOrder {
        &self.feature_order
    }

    /// Encoder over this store's encoder table and feature order
    pub fn feature_encoder(&self) -> FeatureEncoder<'_> {
        FeatureEncoder::new(&self.encoders, &self.feature_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DecisionTree, RandomForest, TreeNode};

    fn leaf_forest(n_features: Option<usize>) -> RandomForest {
        let forest = RandomForest::from_trees(vec![DecisionTree::from_root(TreeNode::Leaf { value: 1.0 })]);
        match n_features {
            Some(n) => forest.with_n_features(n),
            None => forest,
        }
    }

    #[test]
    fn test_new_checks_feature_count() {
        let order = FeatureOrder::new(["Platform", "Year"]).unwrap();

        assert!(ArtifactStore::new(leaf_forest(Some(2)), EncoderTable::new(), order.clone()).is_ok());
        assert!(ArtifactStore::new(leaf_forest(None), EncoderTable::new(), order.clone()).is_ok());

        let err = ArtifactStore::new(leaf_forest(Some(3)), EncoderTable::new(), order).unwrap_err();
        assert!(matches!(err, SalesError::Mismatch(_)));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        std::fs::write(
            &paths.model,
            r#"{"type": "decision_tree", "children_left": [1, -1, -1], "children_right": [2, -1, -1],
                "feature": [1, -2, -2], "threshold": [2000.0, -2.0, -2.0], "value": [1.0, 0.5, 1.5]}"#,
        )
        .unwrap();
        std::fs::write(&paths.encoders, r#"{"Platform": {"classes": ["PS4", "Wii"]}}"#).unwrap();
        std::fs::write(&paths.features, r#"["Platform", "Year"]"#).unwrap();

        let store = ArtifactStore::load(&paths).unwrap();
        assert_eq!(store.feature_order().len(), 2);
        assert_eq!(store.encoders().len(), 1);
        assert!(store.predictor().describe().starts_with("decision tree"));
    }

    #[test]
    fn test_load_rejects_split_beyond_features() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        std::fs::write(
            &paths.model,
            r#"{"type": "decision_tree", "children_left": [1, -1, -1], "children_right": [2, -1, -1],
                "feature": [5, -2, -2], "threshold": [0.0, -2.0, -2.0], "value": [0.5, 0.0, 1.0]}"#,
        )
        .unwrap();
        std::fs::write(&paths.encoders, "{}").unwrap();
        std::fs::write(&paths.features, r#"["Platform", "Year"]"#).unwrap();

        let err = ArtifactStore::load(&paths).unwrap_err();
        assert!(matches!(err, SalesError::Artifact { .. }));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtifactStore::load(&ArtifactPaths::in_dir(dir.path())).unwrap_err();
        assert!(matches!(err, SalesError::Artifact { .. }));
    }
}
