//! Gradient Boosted Decision Tree (GBDT) trainer
//!
//! Fits a binary classifier by second-order boosting on the logistic
//! loss. Training is fully deterministic: columns are presorted once,
//! split ties resolve by [`SplitTieBreaker`](crate::deterministic::SplitTieBreaker),
//! and parallel work always reduces in feature order.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::cart::{CartBuilder, SortedColumns, TreeConfig};
use crate::errors::{GbdtError, Result};
use crate::model::{logit, sigmoid, Model};
use crate::tree::Tree;

/// Smallest hessian handed to the tree builder
const MIN_HESSIAN: f64 = 1e-16;

/// Base rates are clamped into `[EPS, 1 - EPS]` before taking the log-odds.
const BASE_RATE_EPS: f64 = 1e-6;

/// GBDT training configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GbdtConfig {
    pub num_trees: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    /// L2 regularization on leaf weights
    pub lambda: f64,
    /// Minimum loss reduction required to split
    pub gamma: f64,
    /// Minimum hessian sum per child
    pub min_child_weight: f64,
    pub min_samples_leaf: usize,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self {
            num_trees: 100,
            max_depth: 6,
            learning_rate: 0.3,
            lambda: 1.0,
            gamma: 0.0,
            min_child_weight: 1.0,
            min_samples_leaf: 1,
        }
    }
}

impl GbdtConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(GbdtError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.lambda >= 0.0) || !(self.gamma >= 0.0) || !(self.min_child_weight >= 0.0) {
            return Err(GbdtError::InvalidConfig(
                "lambda, gamma and min_child_weight must be non-negative".into(),
            ));
        }
        Ok(())
    }

    fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            min_child_weight: self.min_child_weight,
            lambda: self.lambda,
            gamma: self.gamma,
            learning_rate: self.learning_rate,
        }
    }
}

/// GBDT trainer
pub struct GbdtTrainer {
    config: GbdtConfig,
}

impl GbdtTrainer {
    pub fn new(config: GbdtConfig) -> Self {
        Self { config }
    }

    /// Fit a model on row-major `features` and 0/1 `labels`.
    #[instrument(skip_all, fields(rows = features.len(), trees = self.config.num_trees))]
    pub fn train(&self, features: &[Vec<f64>], labels: &[f64], feature_names: &[String]) -> Result<Model> {
        self.config.validate()?;
        let feature_count = validate_inputs(features, labels, feature_names)?;

        let base_margin = self.calculate_base_margin(labels);
        let mut margins = vec![base_margin; features.len()];

        let sorted = SortedColumns::new(features, feature_count);
        let tree_config = self.config.tree_config();
        let mut trees: Vec<Tree> = Vec::with_capacity(self.config.num_trees);

        for tree_idx in 0..self.config.num_trees {
            let (gradients, hessians) = gradients_hessians(labels, &margins);

            let tree = CartBuilder::new(features, &gradients, &hessians, &tree_config).build(&sorted);
            for (margin, row) in margins.iter_mut().zip(features) {
                *margin += tree.evaluate(row);
            }

            debug!(
                "Tree {}/{}: {} nodes, depth {}, logloss {:.6}",
                tree_idx + 1,
                self.config.num_trees,
                tree.nodes.len(),
                tree.depth(),
                log_loss(labels, &margins)
            );
            trees.push(tree);
        }

        info!(
            "Trained {} trees on {} samples, final logloss {:.6}",
            trees.len(),
            features.len(),
            log_loss(labels, &margins)
        );

        Ok(Model::new(trees, base_margin, feature_names.to_vec()))
    }

    /// Log-odds of the positive rate
    fn calculate_base_margin(&self, labels: &[f64]) -> f64 {
        let positives: f64 = labels.iter().sum();
        let rate = (positives / labels.len() as f64).clamp(BASE_RATE_EPS, 1.0 - BASE_RATE_EPS);
        logit(rate)
    }
}

fn validate_inputs(features: &[Vec<f64>], labels: &[f64], feature_names: &[String]) -> Result<usize> {
    if features.is_empty() {
        return Err(GbdtError::EmptyDataset);
    }
    if features.len() != labels.len() {
        return Err(GbdtError::LabelCountMismatch {
            features: features.len(),
            labels: labels.len(),
        });
    }

    let feature_count = feature_names.len();
    for (row, values) in features.iter().enumerate() {
        if values.len() != feature_count {
            return Err(GbdtError::ShapeMismatch {
                row,
                expected: feature_count,
                got: values.len(),
            });
        }
    }
    for (row, &value) in labels.iter().enumerate() {
        if value != 0.0 && value != 1.0 {
            return Err(GbdtError::InvalidLabel { row, value });
        }
    }

    Ok(feature_count)
}

/// Logistic-loss gradient `p - y` and hessian `p (1 - p)`
fn gradients_hessians(labels: &[f64], margins: &[f64]) -> (Vec<f64>, Vec<f64>) {
    labels
        .iter()
        .zip(margins)
        .map(|(&y, &m)| {
            let p = sigmoid(m);
            (p - y, (p * (1.0 - p)).max(MIN_HESSIAN))
        })
        .unzip()
}

/// Mean binary cross-entropy of margins against labels
pub fn log_loss(labels: &[f64], margins: &[f64]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let total: f64 = labels
        .iter()
        .zip(margins)
        .map(|(&y, &m)| {
            let p = sigmoid(m).clamp(1e-15, 1.0 - 1e-15);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    total / labels.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_simple_dataset() -> (Vec<Vec<f64>>, Vec<f64>, Vec<String>) {
        let features: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![i as f64, (i % 7) as f64])
            .collect();
        let labels: Vec<f64> = (0..40).map(|i| if i >= 20 { 1.0 } else { 0.0 }).collect();
        let names = vec!["x".to_string(), "noise".to_string()];
        (features, labels, names)
    }

    fn small_config() -> GbdtConfig {
        GbdtConfig {
            num_trees: 10,
            max_depth: 2,
            min_child_weight: 0.0,
            ..GbdtConfig::default()
        }
    }

    #[test]
    fn test_train_separates_simple_threshold() {
        let (features, labels, names) = create_simple_dataset();
        let model = GbdtTrainer::new(small_config()).train(&features, &labels, &names).unwrap();

        assert_eq!(model.trees.len(), 10);
        assert_eq!(model.feature_names, names);
        assert_eq!(model.predict(&[5.0, 1.0]), 0);
        assert_eq!(model.predict(&[35.0, 1.0]), 1);
    }

    #[test]
    fn test_base_margin_matches_positive_rate() {
        let trainer = GbdtTrainer::new(GbdtConfig::default());
        assert!(trainer.calculate_base_margin(&[0.0, 1.0]).abs() < 1e-12);

        let margin = trainer.calculate_base_margin(&[1.0, 1.0, 1.0, 0.0]);
        assert!((sigmoid(margin) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_loss_decreases() {
        let (features, labels, names) = create_simple_dataset();
        let model = GbdtTrainer::new(small_config()).train(&features, &labels, &names).unwrap();

        let base = vec![model.base_margin; labels.len()];
        let fitted: Vec<f64> = features.iter().map(|row| model.margin(row)).collect();
        assert!(log_loss(&labels, &fitted) < log_loss(&labels, &base));
    }

    #[test]
    fn test_single_class_degenerates_to_base() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0]];
        let labels = vec![0.0; 3];
        let model = GbdtTrainer::new(small_config())
            .train(&features, &labels, &["x".to_string()])
            .unwrap();
        assert_eq!(model.predict(&[2.0]), 0);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let trainer = GbdtTrainer::new(small_config());
        let names = vec!["x".to_string()];

        assert!(matches!(trainer.train(&[], &[], &names), Err(GbdtError::EmptyDataset)));
        assert!(matches!(
            trainer.train(&[vec![1.0]], &[1.0, 0.0], &names),
            Err(GbdtError::LabelCountMismatch { .. })
        ));
        assert!(matches!(
            trainer.train(&[vec![1.0, 2.0]], &[1.0], &names),
            Err(GbdtError::ShapeMismatch { row: 0, .. })
        ));
        assert!(matches!(
            trainer.train(&[vec![1.0]], &[0.5], &names),
            Err(GbdtError::InvalidLabel { row: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_non_positive_learning_rate() {
        let config = GbdtConfig {
            learning_rate: 0.0,
            ..GbdtConfig::default()
        };
        assert!(matches!(config.validate(), Err(GbdtError::InvalidConfig(_))));
    }
}
