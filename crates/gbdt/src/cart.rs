//! CART (Classification and Regression Tree) builder
//!
//! Exact-greedy second-order tree construction. Every feature column is
//! sorted once per training run; each split stably partitions the sorted
//! columns into the children, so a level costs O(rows × features).
//! Missing values (`NaN`) are kept out of the sorted columns and sent to
//! whichever side scores better.

use rayon::prelude::*;

use crate::deterministic::SplitTieBreaker;
use crate::tree::{Node, Tree};

/// Loss changes at or below this are treated as no improvement.
const MIN_SPLIT_GAIN: f64 = 1e-6;

/// Training parameters for a single tree
#[derive(Clone, Debug, PartialEq)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub min_child_weight: f64,
    pub lambda: f64,
    pub gamma: f64,
    pub learning_rate: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_samples_leaf: 1,
            min_child_weight: 1.0,
            lambda: 1.0,
            gamma: 0.0,
            learning_rate: 0.3,
        }
    }
}

/// Row indices of every feature column, ordered by value; missing rows omitted
#[derive(Clone, Debug)]
pub struct SortedColumns {
    columns: Vec<Vec<usize>>,
}

impl SortedColumns {
    pub fn new(features: &[Vec<f64>], feature_count: usize) -> Self {
        let columns = (0..feature_count)
            .into_par_iter()
            .map(|f| {
                let mut rows: Vec<usize> = (0..features.len())
                    .filter(|&r| !features[r][f].is_nan())
                    .collect();
                rows.sort_by(|&a, &b| features[a][f].total_cmp(&features[b][f]).then(a.cmp(&b)));
                rows
            })
            .collect();

        Self { columns }
    }
}

/// Samples reaching one node
struct NodeSamples {
    rows: Vec<usize>,
    columns: Vec<Vec<usize>>,
}

/// Gradient and hessian sums of the node being split
struct NodeTotals {
    g: f64,
    h: f64,
    n: usize,
    score: f64,
}

/// Split candidate with gain and tie-breaker
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    default_left: bool,
    gain: f64,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn beats(&self, other: &SplitCandidate) -> bool {
        self.gain > other.gain || (self.gain == other.gain && self.tie_breaker < other.tie_breaker)
    }
}

/// Build a regression tree on gradients and hessians
pub struct CartBuilder<'a> {
    config: &'a TreeConfig,
    features: &'a [Vec<f64>],
    gradients: &'a [f64],
    hessians: &'a [f64],
}

impl<'a> CartBuilder<'a> {
    pub fn new(
        features: &'a [Vec<f64>],
        gradients: &'a [f64],
        hessians: &'a [f64],
        config: &'a TreeConfig,
    ) -> Self {
        assert_eq!(features.len(), gradients.len());
        assert_eq!(features.len(), hessians.len());

        Self {
            config,
            features,
            gradients,
            hessians,
        }
    }

    /// Build tree and return nodes
    pub fn build(&self, sorted: &SortedColumns) -> Tree {
        let root = NodeSamples {
            rows: (0..self.features.len()).collect(),
            columns: sorted.columns.clone(),
        };

        let mut nodes = Vec::new();
        let mut goes_left = vec![false; self.features.len()];
        self.build_node(root, 0, &mut nodes, &mut goes_left);

        Tree::new(nodes)
    }

    /// Recursively build tree nodes, returning the index of the new node
    fn build_node(
        &self,
        samples: NodeSamples,
        depth: usize,
        nodes: &mut Vec<Node>,
        goes_left: &mut [bool],
    ) -> i32 {
        let current_idx = nodes.len() as i32;
        let (sum_g, sum_h) = self.sum_gradients_hessians(&samples.rows);
        let leaf_value = self.leaf_weight(sum_g, sum_h);

        if depth >= self.config.max_depth || samples.rows.len() < 2 * self.config.min_samples_leaf.max(1) {
            nodes.push(Node::leaf(current_idx, leaf_value, sum_h));
            return current_idx;
        }

        let split = match self.find_best_split(&samples, sum_g, sum_h) {
            Some(s) => s,
            None => {
                nodes.push(Node::leaf(current_idx, leaf_value, sum_h));
                return current_idx;
            }
        };

        // Reserve space for current node
        nodes.push(Node::internal(
            current_idx,
            split.feature_idx as i32,
            split.threshold,
            split.default_left,
            sum_h,
        ));

        let (left, right) = self.partition(samples, &split, goes_left);

        let left_idx = self.build_node(left, depth + 1, nodes, goes_left);
        let right_idx = self.build_node(right, depth + 1, nodes, goes_left);

        let node = &mut nodes[current_idx as usize];
        node.left = left_idx;
        node.right = right_idx;

        current_idx
    }

    /// Split node samples into children, keeping column order stable
    fn partition(
        &self,
        samples: NodeSamples,
        split: &SplitCandidate,
        goes_left: &mut [bool],
    ) -> (NodeSamples, NodeSamples) {
        let f = split.feature_idx;
        for &row in &samples.rows {
            let value = self.features[row][f];
            goes_left[row] = if value.is_nan() {
                split.default_left
            } else {
                value <= split.threshold
            };
        }

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            samples.rows.iter().partition(|&&row| goes_left[row]);

        let mut left_columns = Vec::with_capacity(samples.columns.len());
        let mut right_columns = Vec::with_capacity(samples.columns.len());
        for column in samples.columns {
            let (l, r): (Vec<usize>, Vec<usize>) = column.into_iter().partition(|&row| goes_left[row]);
            left_columns.push(l);
            right_columns.push(r);
        }

        (
            NodeSamples {
                rows: left_rows,
                columns: left_columns,
            },
            NodeSamples {
                rows: right_rows,
                columns: right_columns,
            },
        )
    }

    /// Find best split using exact-greedy search; features are scanned in parallel
    fn find_best_split(&self, samples: &NodeSamples, sum_g: f64, sum_h: f64) -> Option<SplitCandidate> {
        let per_feature: Vec<Option<SplitCandidate>> = (0..samples.columns.len())
            .into_par_iter()
            .map(|f| self.best_split_for_feature(samples, f, sum_g, sum_h))
            .collect();

        let mut best_split: Option<SplitCandidate> = None;
        for candidate in per_feature.into_iter().flatten() {
            best_split = match best_split {
                Some(current) if !candidate.beats(&current) => Some(current),
                _ => Some(candidate),
            };
        }
        best_split
    }

    fn best_split_for_feature(
        &self,
        samples: &NodeSamples,
        feature_idx: usize,
        sum_g: f64,
        sum_h: f64,
    ) -> Option<SplitCandidate> {
        let column = &samples.columns[feature_idx];
        let n_total = samples.rows.len();
        let n_missing = n_total - column.len();
        if column.is_empty() || (column.len() < 2 && n_missing == 0) {
            return None;
        }

        let (missing_g, missing_h) = if n_missing == 0 {
            (0.0, 0.0)
        } else {
            let missing: Vec<usize> = samples
                .rows
                .iter()
                .copied()
                .filter(|&r| self.features[r][feature_idx].is_nan())
                .collect();
            self.sum_gradients_hessians(&missing)
        };

        let node = NodeTotals {
            g: sum_g,
            h: sum_h,
            n: n_total,
            score: self.score(sum_g, sum_h),
        };
        let directions: &[bool] = if n_missing == 0 { &[false] } else { &[false, true] };

        let mut best: Option<SplitCandidate> = None;
        let mut offer = |candidate: Option<SplitCandidate>| {
            if let Some(candidate) = candidate {
                if best.as_ref().map_or(true, |current| candidate.beats(current)) {
                    best = Some(candidate);
                }
            }
        };

        let mut prefix_g = 0.0;
        let mut prefix_h = 0.0;
        for rank in 0..column.len() - 1 {
            let row = column[rank];
            prefix_g += self.gradients[row];
            prefix_h += self.hessians[row];

            let value = self.features[row][feature_idx];
            let next_value = self.features[column[rank + 1]][feature_idx];
            if value == next_value {
                continue;
            }

            for &default_left in directions {
                let left = if default_left {
                    (prefix_g + missing_g, prefix_h + missing_h, rank + 1 + n_missing)
                } else {
                    (prefix_g, prefix_h, rank + 1)
                };
                offer(self.candidate(feature_idx, value, rank, default_left, left, &node));
            }
        }

        // Present values left, missing values right.
        if n_missing > 0 {
            let rank = column.len() - 1;
            let max_value = self.features[column[rank]][feature_idx];
            let left = (node.g - missing_g, node.h - missing_h, column.len());
            offer(self.candidate(feature_idx, max_value, rank, false, left, &node));
        }

        best
    }

    /// Score one split given the left child's `(G, H, count)`.
    fn candidate(
        &self,
        feature_idx: usize,
        threshold: f64,
        rank: usize,
        default_left: bool,
        (g_left, h_left, n_left): (f64, f64, usize),
        node: &NodeTotals,
    ) -> Option<SplitCandidate> {
        let g_right = node.g - g_left;
        let h_right = node.h - h_left;
        let n_right = node.n - n_left;

        if n_left < self.config.min_samples_leaf
            || n_right < self.config.min_samples_leaf
            || h_left < self.config.min_child_weight
            || h_right < self.config.min_child_weight
        {
            return None;
        }

        let gain =
            0.5 * (self.score(g_left, h_left) + self.score(g_right, h_right) - node.score) - self.config.gamma;
        if gain <= MIN_SPLIT_GAIN {
            return None;
        }

        Some(SplitCandidate {
            feature_idx,
            threshold,
            default_left,
            gain,
            tie_breaker: SplitTieBreaker::new(feature_idx, rank, default_left),
        })
    }

    /// Structure score G² / (H + λ)
    fn score(&self, g: f64, h: f64) -> f64 {
        g * g / (h + self.config.lambda)
    }

    /// Optimal leaf weight -G / (H + λ), shrunk by the learning rate
    fn leaf_weight(&self, g: f64, h: f64) -> f64 {
        let denom = h + self.config.lambda;
        if denom <= 0.0 {
            return 0.0;
        }
        -g / denom * self.config.learning_rate
    }

    fn sum_gradients_hessians(&self, rows: &[usize]) -> (f64, f64) {
        rows.iter().fold((0.0, 0.0), |(g, h), &r| {
            (g + self.gradients[r], h + self.hessians[r])
        })
    }
}
