//! offerlab trainer - offer-completion modeling
//!
//! Labels received offers by whether they were completed, encodes the
//! training table, fits a boosted-tree classifier on a seeded 80/20 split
//! and reports test metrics and SHAP feature importance.

pub mod config;
pub mod dataset;
pub mod errors;
pub mod features;
pub mod importance;
pub mod labels;
pub mod metrics;
pub mod pipeline;
pub mod split;

pub use config::TrainingConfig;
pub use dataset::read_unified;
pub use errors::TrainerError;
pub use features::{build_training_set, feature_names, TrainingSet, FEATURE_COLUMNS};
pub use importance::FeatureImportance;
pub use labels::{label_received, LabeledRecord};
pub use metrics::Metrics;
pub use pipeline::{run, train_on_records, TrainingReport};
pub use split::{train_test_split, Split};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
