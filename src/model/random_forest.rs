//! Random Forest regressor

use crate::error::{Result, SalesError};
use super::decision_tree::DecisionTree;
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random Forest model: the mean of its trees' predictions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Number of features the forest was fitted on, when recorded
    #[serde(default)]
    n_features: Option<usize>,
}

impl RandomForest {
    /// Build a forest from fitted trees
    pub fn from_trees(trees: Vec<DecisionTree>) -> Self {
        Self { trees, n_features: None }
    }

    /// Record the feature count the forest was fitted on
    pub fn with_n_features(mut self, n_features: usize) -> Self {
        self.n_features = Some(n_features);
        self
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(SalesError::Prediction("forest has no trees".to_string()));
        }

        let all_predictions: Vec<Array1<f64>> = self.trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let n_trees = all_predictions.len() as f64;
        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let sum: f64 = all_predictions.iter().map(|p| p[i]).sum();
                sum / n_trees
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Number of features recorded at fit time, falling back to the trees' record
    pub fn n_features(&self) -> Option<usize> {
        self.n_features
            .or_else(|| self.trees.iter().find_map(DecisionTree::n_features))
    }

    /// Highest feature index any tree reads
    pub fn max_feature_idx(&self) -> Option<usize> {
        self.trees.iter().filter_map(DecisionTree::max_feature_idx).max()
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Depth of the deepest tree
    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(DecisionTree::get_depth).max().unwrap_or(0)
    }
}

impl super::Predictor for RandomForest {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        RandomForest::predict(self, x)
    }

    fn n_features(&self) -> Option<usize> {
        RandomForest::n_features(self)
    }

    fn describe(&self) -> String {
        format!(
            "random forest ({} trees, max depth {})",
            self.n_trees(),
            self.max_depth()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeNode;
    use ndarray::array;

    fn stump(threshold: f64, left: f64, right: f64) -> DecisionTree {
        DecisionTree::from_root(TreeNode::Split {
            feature_idx: 0,
            threshold,
            left: Box::new(TreeNode::Leaf { value: left }),
            right: Box::new(TreeNode::Leaf { value: right }),
        })
    }

    #[test]
    fn test_mean_of_trees() {
        let forest = RandomForest::from_trees(vec![
            stump(1.0, 1.0, 3.0),
            stump(2.0, 2.0, 4.0),
        ]);
        let x = array![[0.0], [1.5], [5.0]];

        let predictions = forest.predict(&x).unwrap();
        assert_eq!(predictions.to_vec(), vec![1.5, 2.5, 3.5]);
        assert_eq!(forest.n_trees(), 2);
        assert_eq!(forest.max_depth(), 2);
    }

    #[test]
    fn test_empty_forest_is_error() {
        let forest = RandomForest::from_trees(Vec::new());
        assert!(forest.predict(&array![[1.0]]).is_err());
    }

    #[test]
    fn test_tree_error_propagates() {
        let bad = DecisionTree::from_root(TreeNode::Split {
            feature_idx: 9,
            threshold: 0.0,
            left: Box::new(TreeNode::Leaf { value: 0.0 }),
            right: Box::new(TreeNode::Leaf { value: 1.0 }),
        });
        let forest = RandomForest::from_trees(vec![stump(1.0, 1.0, 3.0), bad]);

        assert!(forest.predict(&array![[0.5]]).is_err());
        assert_eq!(forest.max_feature_idx(), Some(9));
    }

    #[test]
    fn test_n_features_falls_back_to_trees() {
        let forest = RandomForest::from_trees(vec![stump(1.0, 0.0, 1.0).with_n_features(8)]);
        assert_eq!(forest.n_features(), Some(8));

        let forest = forest.with_n_features(4);
        assert_eq!(forest.n_features(), Some(4));
    }
}
