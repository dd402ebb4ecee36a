//! Path-dependent TreeSHAP
//!
//! Exact Shapley attributions for tree ensembles (Lundberg et al., 2018),
//! computed in margin (log-odds) space. Node covers weight the paths the
//! sample does not take. For every row,
//! `expected_value() + Σ shap_values(row) == model.margin(row)`.

use rayon::prelude::*;

use crate::model::Model;
use crate::tree::Tree;

/// One feature on the current root-to-node path
#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: i32,
    zero_fraction: f64,
    one_fraction: f64,
    weight: f64,
}

pub struct TreeExplainer<'a> {
    model: &'a Model,
}

impl<'a> TreeExplainer<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// Margin of the average training sample
    pub fn expected_value(&self) -> f64 {
        self.model.base_margin + self.model.trees.iter().map(Tree::expected_value).sum::<f64>()
    }

    /// Attribution of each feature for one row
    pub fn shap_values(&self, features: &[f64]) -> Vec<f64> {
        let mut phi = vec![0.0; self.model.feature_count()];
        for tree in &self.model.trees {
            if !tree.nodes.is_empty() {
                recurse(tree, features, &mut phi, 0, &[], 1.0, 1.0, -1);
            }
        }
        phi
    }

    /// Attributions for many rows, in input order
    pub fn shap_matrix(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.par_iter().map(|row| self.shap_values(row)).collect()
    }
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &Tree,
    features: &[f64],
    phi: &mut [f64],
    node_idx: usize,
    parent_path: &[PathElement],
    zero_fraction: f64,
    one_fraction: f64,
    feature: i32,
) {
    let mut path = parent_path.to_vec();
    extend_path(&mut path, zero_fraction, one_fraction, feature);

    let node = &tree.nodes[node_idx];
    if let Some(value) = node.leaf {
        for i in 1..path.len() {
            let weight = unwound_path_sum(&path, i);
            let element = path[i];
            phi[element.feature as usize] += weight * (element.one_fraction - element.zero_fraction) * value;
        }
        return;
    }

    let hot = node.next_child(features);
    let cold = if hot == node.left as usize {
        node.right as usize
    } else {
        node.left as usize
    };

    let hot_cover = tree.nodes[hot].cover;
    let cold_cover = tree.nodes[cold].cover;
    let total_cover = hot_cover + cold_cover;
    let (hot_share, cold_share) = if total_cover > 0.0 {
        (hot_cover / total_cover, cold_cover / total_cover)
    } else {
        (0.5, 0.5)
    };

    // A feature seen higher up the path is folded into this split.
    let mut incoming_zero = 1.0;
    let mut incoming_one = 1.0;
    if let Some(k) = (1..path.len()).find(|&k| path[k].feature == node.feature_idx) {
        incoming_zero = path[k].zero_fraction;
        incoming_one = path[k].one_fraction;
        unwind_path(&mut path, k);
    }

    recurse(
        tree,
        features,
        phi,
        hot,
        &path,
        incoming_zero * hot_share,
        incoming_one,
        node.feature_idx,
    );
    recurse(
        tree,
        features,
        phi,
        cold,
        &path,
        incoming_zero * cold_share,
        0.0,
        node.feature_idx,
    );
}

fn extend_path(path: &mut Vec<PathElement>, zero_fraction: f64, one_fraction: f64, feature: i32) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        weight: if depth == 0 { 1.0 } else { 0.0 },
    });

    let denom = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].weight += one_fraction * path[i].weight * (i + 1) as f64 / denom;
        path[i].weight = zero_fraction * path[i].weight * (depth - i) as f64 / denom;
    }
}

fn unwind_path(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let denom = (depth + 1) as f64;
    let mut next = path[depth].weight;

    for j in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = path[j].weight;
            path[j].weight = next * denom / ((j + 1) as f64 * one_fraction);
            next = tmp - path[j].weight * zero_fraction * (depth - j) as f64 / denom;
        } else {
            path[j].weight = path[j].weight * denom / (zero_fraction * (depth - j) as f64);
        }
    }

    for j in index..depth {
        path[j].feature = path[j + 1].feature;
        path[j].zero_fraction = path[j + 1].zero_fraction;
        path[j].one_fraction = path[j + 1].one_fraction;
    }
    path.pop();
}

/// Total permutation weight of the path with element `index` removed
fn unwound_path_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let denom = (depth + 1) as f64;
    let mut next = path[depth].weight;
    let mut total = 0.0;

    for j in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = next * denom / ((j + 1) as f64 * one_fraction);
            total += tmp;
            next = path[j].weight - tmp * zero_fraction * (depth - j) as f64 / denom;
        } else if zero_fraction != 0.0 {
            total += path[j].weight * denom / (zero_fraction * (depth - j) as f64);
        }
    }

    total
}
