//! Boosted-tree binary classifier
//!
//! The ensemble output is a log-odds margin: `base_margin` plus the sum of
//! every tree's leaf value. Probabilities come from the logistic link.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{GbdtError, Result};
use crate::serialization::{canonical_json_string, hash_hex};
use crate::tree::Tree;

/// Current model format version
pub const MODEL_VERSION: i32 = 1;

/// Probability above which a sample is classified positive
pub const DECISION_THRESHOLD: f64 = 0.5;

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Model {
    pub version: i32,
    pub objective: String,
    pub base_margin: f64,
    pub feature_names: Vec<String>,
    pub trees: Vec<Tree>,
}

impl Model {
    pub fn new(trees: Vec<Tree>, base_margin: f64, feature_names: Vec<String>) -> Self {
        Self {
            version: MODEL_VERSION,
            objective: "binary:logistic".to_string(),
            base_margin,
            feature_names,
            trees,
        }
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    /// Raw log-odds for one feature vector
    pub fn margin(&self, features: &[f64]) -> f64 {
        self.base_margin + self.trees.iter().map(|t| t.evaluate(features)).sum::<f64>()
    }

    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        sigmoid(self.margin(features))
    }

    /// Class label, 1 when the probability exceeds [`DECISION_THRESHOLD`]
    pub fn predict(&self, features: &[f64]) -> u8 {
        u8::from(self.predict_proba(features) > DECISION_THRESHOLD)
    }

    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Vec<u8> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Validate model structure
    pub fn validate(&self) -> Result<()> {
        if self.version != MODEL_VERSION {
            return Err(GbdtError::ValidationFailed(format!(
                "Unsupported model version: {}",
                self.version
            )));
        }
        if !self.base_margin.is_finite() {
            return Err(GbdtError::ValidationFailed("Non-finite base margin".into()));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_count()).map_err(|e| {
                GbdtError::ValidationFailed(format!("Tree {i} validation failed: {e}"))
            })?;
        }
        Ok(())
    }

    /// blake3 digest of the canonical JSON encoding, hex encoded
    pub fn hash_hex(&self) -> Result<String> {
        Ok(hash_hex(&canonical_json_string(self)?))
    }

    /// Write `model.json` (canonical JSON) and `model.hash` into `dir`.
    pub fn write_artifacts(&self, dir: &Path) -> Result<(PathBuf, String)> {
        self.validate()?;
        std::fs::create_dir_all(dir)?;

        let json = canonical_json_string(self)?;
        let hash = hash_hex(&json);

        let model_path = dir.join("model.json");
        std::fs::write(&model_path, &json)?;
        std::fs::write(dir.join("model.hash"), &hash)?;

        info!("Saved model to {} ({})", model_path.display(), hash);
        Ok((model_path, hash))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let model: Model = serde_json::from_str(&content)?;
        model.validate()?;
        Ok(model)
    }
}
