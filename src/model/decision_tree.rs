//! Fitted regression tree
//!
//! Trees are stored flat, one entry per node, in the same parallel-array
//! layout scikit-learn exposes as `tree_`: a node is a leaf when both child
//! indices are `-1`. Children always come after their parent, so evaluation
//! and every traversal here are plain loops with no recursion.

use crate::error::{Result, SalesError};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Child index marking a leaf
pub const TREE_LEAF: i64 = -1;
/// Feature index stored for leaves
pub const TREE_UNDEFINED: i64 = -2;

/// Nested tree description, flattened by [`DecisionTree::from_root`]
#[derive(Debug, Clone)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf {
        value: f64,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// On-disk shape of a tree: parallel arrays indexed by node id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeArrays {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Regression tree as exported by the training pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TreeArrays", into = "TreeArrays")]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: Option<usize>,
}

impl TryFrom<TreeArrays> for DecisionTree {
    type Error = String;

    fn try_from(arrays: TreeArrays) -> std::result::Result<Self, Self::Error> {
        let n_nodes = arrays.children_left.len();
        if n_nodes == 0 {
            return Err("tree has no nodes".to_string());
        }
        let lengths = [
            ("children_right", arrays.children_right.len()),
            ("feature", arrays.feature.len()),
            ("threshold", arrays.threshold.len()),
            ("value", arrays.value.len()),
        ];
        if let Some((name, len)) = lengths.iter().find(|(_, len)| *len != n_nodes) {
            return Err(format!(
                "tree array '{}' has {} entries, expected {}",
                name, len, n_nodes
            ));
        }

        // A child must sit after its parent and inside the arrays
        let child = |id: usize, raw: i64| -> std::result::Result<usize, String> {
            usize::try_from(raw)
                .ok()
                .filter(|&c| c > id && c < n_nodes)
                .ok_or_else(|| format!("node {} has invalid child index {}", id, raw))
        };

        let mut nodes = Vec::with_capacity(n_nodes);
        for id in 0..n_nodes {
            let (left, right) = (arrays.children_left[id], arrays.children_right[id]);
            let node = match (left == TREE_LEAF, right == TREE_LEAF) {
                (true, true) => Node::Leaf(arrays.value[id]),
                (false, false) => Node::Split {
                    feature: usize::try_from(arrays.feature[id]).map_err(|_| {
                        format!("split node {} has feature index {}", id, arrays.feature[id])
                    })?,
                    threshold: arrays.threshold[id],
                    left: child(id, left)?,
                    right: child(id, right)?,
                },
                _ => return Err(format!("node {} has exactly one child", id)),
            };
            nodes.push(node);
        }

        Ok(Self { nodes, n_features: arrays.n_features })
    }
}

impl From<DecisionTree> for TreeArrays {
    fn from(tree: DecisionTree) -> Self {
        let n = tree.nodes.len();
        let mut arrays = TreeArrays {
            children_left: Vec::with_capacity(n),
            children_right: Vec::with_capacity(n),
            feature: Vec::with_capacity(n),
            threshold: Vec::with_capacity(n),
            value: Vec::with_capacity(n),
            n_features: tree.n_features,
        };
        for node in tree.nodes {
            let (left, right, feature, threshold, value) = match node {
                Node::Leaf(value) => (TREE_LEAF, TREE_LEAF, TREE_UNDEFINED, TREE_UNDEFINED as f64, value),
                Node::Split { feature, threshold, left, right } => {
                    (left as i64, right as i64, feature as i64, threshold, 0.0)
                }
            };
            arrays.children_left.push(left);
            arrays.children_right.push(right);
            arrays.feature.push(feature);
            arrays.threshold.push(threshold);
            arrays.value.push(value);
        }
        arrays
    }
}

impl DecisionTree {
    /// Flatten a nested description, numbering nodes in pre-order
    pub fn from_root(root: TreeNode) -> Self {
        let mut nodes = Vec::new();
        // (node, parent id and whether it is the left child)
        let mut pending: Vec<(TreeNode, Option<(usize, bool)>)> = vec![(root, None)];

        while let Some((node, parent)) = pending.pop() {
            let id = nodes.len();
            if let Some((parent_id, is_left)) = parent {
                if let Node::Split { left, right, .. } = &mut nodes[parent_id] {
                    if is_left { *left = id } else { *right = id }
                }
            }
            match node {
                TreeNode::Leaf { value } => nodes.push(Node::Leaf(value)),
                TreeNode::Split { feature_idx, threshold, left, right } => {
                    nodes.push(Node::Split { feature: feature_idx, threshold, left: 0, right: 0 });
                    pending.push((*right, Some((id, false))));
                    pending.push((*left, Some((id, true))));
                }
            }
        }

        Self { nodes, n_features: None }
    }

    /// Record the feature count the tree was fitted on
    pub fn with_n_features(mut self, n_features: usize) -> Self {
        self.n_features = Some(n_features);
        self
    }

    /// Make predictions, one per row of `x`
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let predictions = x
            .rows()
            .into_iter()
            .map(|sample| self.predict_sample(&sample))
            .collect::<Result<Vec<f64>>>()?;

        Ok(Array1::from_vec(predictions))
    }

    fn predict_sample(&self, sample: &ArrayView1<f64>) -> Result<f64> {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                Node::Leaf(value) => return Ok(value),
                Node::Split { feature, threshold, left, right } => {
                    let value = sample.get(feature).ok_or_else(|| {
                        SalesError::Prediction(format!(
                            "tree splits on feature {} but the sample has {} features",
                            feature,
                            sample.len()
                        ))
                    })?;
                    id = if *value <= threshold { left } else { right };
                }
            }
        }
    }

    /// Number of features recorded at fit time
    pub fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    /// Highest feature index any split reads, if the tree has splits
    pub fn max_feature_idx(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Split { feature, .. } => Some(*feature),
                Node::Leaf(_) => None,
            })
            .max()
    }

    /// Get tree depth, counting nodes on the longest root-to-leaf path
    pub fn get_depth(&self) -> usize {
        let mut depth = vec![0usize; self.nodes.len()];
        depth[0] = 1;
        for (id, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = *node {
                depth[left] = depth[id] + 1;
                depth[right] = depth[id] + 1;
            }
        }
        depth.into_iter().max().unwrap_or(0)
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        self.nodes.iter().filter(|node| matches!(node, Node::Leaf(_))).count()
    }

    /// Total node count
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
}
