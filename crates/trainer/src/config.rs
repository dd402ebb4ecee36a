//! Training stage configuration
//!
//! Defaults, then the `[training]` table of an optional TOML file (with its
//! nested `[training.gbdt]` hyperparameters), then `OFFERLAB_*` environment
//! variables. The binary applies CLI flags last.

use offerlab_gbdt::GbdtConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::errors::{Result, TrainerError};
use crate::split::{DEFAULT_SEED, DEFAULT_TEST_FRACTION};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Unified CSV produced by the ETL stage
    pub input: PathBuf,
    pub test_fraction: f64,
    pub seed: u64,
    pub gbdt: GbdtConfig,
    /// Optional per-row attribution CSV
    pub shap_output: Option<PathBuf>,
    /// Optional directory for `model.json` and `model.hash`
    pub model_output: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/processed/unified.csv"),
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
            gbdt: GbdtConfig::default(),
            shap_output: None,
            model_output: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    training: TrainingConfig,
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| TrainerError::Config(format!("{key}: invalid value {value:?}")))
}

impl TrainingConfig {
    /// Load defaults, an optional config file and environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| TrainerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| TrainerError::Config(format!("failed to parse config: {e}")))?;
        Ok(file.training)
    }

    /// Apply `OFFERLAB_*` overrides. Unparseable numbers are a config error.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("OFFERLAB_TRAIN_INPUT") {
            self.input = PathBuf::from(val);
        }
        if let Some(val) = lookup("OFFERLAB_TEST_FRACTION") {
            self.test_fraction = parse_env("OFFERLAB_TEST_FRACTION", &val)?;
        }
        if let Some(val) = lookup("OFFERLAB_SEED") {
            self.seed = parse_env("OFFERLAB_SEED", &val)?;
        }
        if let Some(val) = lookup("OFFERLAB_TREES") {
            self.gbdt.num_trees = parse_env("OFFERLAB_TREES", &val)?;
        }
        if let Some(val) = lookup("OFFERLAB_MAX_DEPTH") {
            self.gbdt.max_depth = parse_env("OFFERLAB_MAX_DEPTH", &val)?;
        }
        if let Some(val) = lookup("OFFERLAB_LEARNING_RATE") {
            self.gbdt.learning_rate = parse_env("OFFERLAB_LEARNING_RATE", &val)?;
        }
        if let Some(val) = lookup("OFFERLAB_SHAP_OUTPUT") {
            self.shap_output = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("OFFERLAB_MODEL_OUTPUT") {
            self.model_output = Some(PathBuf::from(val));
        }
        Ok(())
    }
}
