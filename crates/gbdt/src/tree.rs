//! Decision tree structures
//!
//! Nodes live in a flat vector, node 0 is the root. Missing feature values
//! (`NaN`) follow each split's learned default direction.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// For internal nodes `feature_idx >= 0`, `left`/`right` index child
/// nodes and `leaf` is `None`. Leaves carry `feature_idx == -1` and a
/// value that is already scaled by the learning rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: i32,
    pub left: i32,
    pub right: i32,
    pub feature_idx: i32,
    /// Samples with `value <= threshold` go left
    pub threshold: f64,
    /// Direction taken when the feature is missing
    pub default_left: bool,
    /// Sum of training hessians that reached this node
    pub cover: f64,
    pub leaf: Option<f64>,
}

impl Node {
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, default_left: bool, cover: f64) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx,
            threshold,
            default_left,
            cover,
            leaf: None,
        }
    }

    pub fn leaf(id: i32, value: f64, cover: f64) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            default_left: false,
            cover,
            leaf: Some(value),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf.is_some()
    }

    /// Child index a feature vector is routed to. Only meaningful for internal nodes.
    pub fn next_child(&self, features: &[f64]) -> usize {
        let value = features
            .get(self.feature_idx as usize)
            .copied()
            .unwrap_or(f64::NAN);

        let go_left = if value.is_nan() {
            self.default_left
        } else {
            value <= self.threshold
        };

        if go_left {
            self.left as usize
        } else {
            self.right as usize
        }
    }
}

/// A single regression tree of the ensemble
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Index of the leaf a feature vector falls into
    pub fn leaf_index(&self, features: &[f64]) -> usize {
        let mut idx = 0usize;
        while let Some(node) = self.nodes.get(idx) {
            if node.is_leaf() {
                return idx;
            }
            idx = node.next_child(features);
        }
        idx
    }

    /// Leaf value for a feature vector (0.0 for an empty tree)
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        self.nodes
            .get(self.leaf_index(features))
            .and_then(|node| node.leaf)
            .unwrap_or(0.0)
    }

    /// Cover-weighted mean leaf value
    pub fn expected_value(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        self.subtree_expectation(0)
    }

    fn subtree_expectation(&self, idx: usize) -> f64 {
        let node = &self.nodes[idx];
        if let Some(value) = node.leaf {
            return value;
        }

        let left = &self.nodes[node.left as usize];
        let right = &self.nodes[node.right as usize];
        let total = left.cover + right.cover;
        if total <= 0.0 {
            return 0.5 * (self.subtree_expectation(node.left as usize) + self.subtree_expectation(node.right as usize));
        }

        (left.cover * self.subtree_expectation(node.left as usize)
            + right.cover * self.subtree_expectation(node.right as usize))
            / total
    }

    /// Depth of the deepest leaf (a single leaf has depth 0)
    pub fn depth(&self) -> usize {
        fn walk(tree: &Tree, idx: usize) -> usize {
            let node = &tree.nodes[idx];
            if node.is_leaf() {
                0
            } else {
                1 + walk(tree, node.left as usize).max(walk(tree, node.right as usize))
            }
        }

        if self.nodes.is_empty() {
            0
        } else {
            walk(self, 0)
        }
    }

    /// Validate tree structure
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                if !node.leaf.is_some_and(f64::is_finite) {
                    return Err(format!("Leaf node {i} has a non-finite value"));
                }
                continue;
            }

            for (side, child) in [("left", node.left), ("right", node.right)] {
                if child <= i as i32 || child as usize >= self.nodes.len() {
                    return Err(format!("Node {i} has invalid {side} child: {child}"));
                }
            }

            if node.feature_idx < 0 || node.feature_idx as usize >= feature_count {
                return Err(format!(
                    "Internal node {i} has invalid feature index: {}",
                    node.feature_idx
                ));
            }

            if !node.threshold.is_finite() {
                return Err(format!("Internal node {i} has a non-finite threshold"));
            }
        }

        Ok(())
    }
}
