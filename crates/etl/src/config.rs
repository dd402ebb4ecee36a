//! Stage configuration
//!
//! Values come from defaults, then an optional TOML file (`[etl]` table),
//! then `OFFERLAB_*` environment variables. The binary applies CLI flags last.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{EtlError, Result};

/// Input locations and output path for the unification stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    /// Base directory holding the three raw inputs
    pub input_dir: PathBuf,
    /// Transaction events, relative to `input_dir`
    pub transactions: PathBuf,
    /// User profiles, relative to `input_dir`
    pub profiles: PathBuf,
    /// Offer definitions, relative to `input_dir`
    pub offers: PathBuf,
    /// Unified CSV output
    pub output: PathBuf,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data"),
            transactions: PathBuf::from("transactions.json"),
            profiles: PathBuf::from("profile.json"),
            offers: PathBuf::from("offers.json"),
            output: PathBuf::from("data/processed/unified.csv"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    etl: EtlConfig,
}

impl EtlConfig {
    /// Load defaults, an optional config file and environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read the `[etl]` table of a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| EtlError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| EtlError::Config(format!("failed to parse config: {e}")))?;
        Ok(file.etl)
    }

    /// Apply `OFFERLAB_*` overrides from a variable lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("OFFERLAB_INPUT_DIR") {
            self.input_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("OFFERLAB_TRANSACTIONS") {
            self.transactions = PathBuf::from(val);
        }
        if let Some(val) = lookup("OFFERLAB_PROFILES") {
            self.profiles = PathBuf::from(val);
        }
        if let Some(val) = lookup("OFFERLAB_OFFERS") {
            self.offers = PathBuf::from(val);
        }
        if let Some(val) = lookup("OFFERLAB_UNIFIED_OUTPUT") {
            self.output = PathBuf::from(val);
        }
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.input_dir.join(&self.transactions)
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.input_dir.join(&self.profiles)
    }

    pub fn offers_path(&self) -> PathBuf {
        self.input_dir.join(&self.offers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_data_dir() {
        let config = EtlConfig::default();
        assert_eq!(config.transactions_path(), Path::new("data/transactions.json"));
        assert_eq!(config.profiles_path(), Path::new("data/profile.json"));
        assert_eq!(config.offers_path(), Path::new("data/offers.json"));
    }

    #[test]
    fn toml_table_overrides_defaults_partially() {
        let config = EtlConfig::from_toml_str(
            r#"
            [etl]
            input_dir = "/srv/raw"
            output = "/srv/out/unified.csv"

            [training]
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.input_dir, PathBuf::from("/srv/raw"));
        assert_eq!(config.output, PathBuf::from("/srv/out/unified.csv"));
        assert_eq!(config.offers, PathBuf::from("offers.json"));
    }

    #[test]
    fn missing_table_yields_defaults() {
        assert_eq!(EtlConfig::from_toml_str("").unwrap(), EtlConfig::default());
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [("OFFERLAB_INPUT_DIR", "/env/raw"), ("OFFERLAB_OFFERS", "o.json")]
            .into_iter()
            .collect();

        let mut config = EtlConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.offers_path(), Path::new("/env/raw/o.json"));
        assert_eq!(config.profiles, PathBuf::from("profile.json"));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        assert!(matches!(EtlConfig::from_toml_str("[etl"), Err(EtlError::Config(_))));
    }
}
