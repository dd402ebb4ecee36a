//! End-to-end modeling run
//!
//! unified rows → labels → training table → split → fit → evaluate →
//! attributions, with optional attribution and model artifacts.

use offerlab_gbdt::{GbdtTrainer, Model, TreeExplainer};
use offerlab_types::UnifiedRecord;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::config::TrainingConfig;
use crate::dataset::read_unified;
use crate::errors::{Result, TrainerError};
use crate::features::{build_training_set, feature_names};
use crate::importance::{log_report, mean_abs_importance, write_shap_csv, FeatureImportance};
use crate::labels::label_received;
use crate::metrics::Metrics;
use crate::split::train_test_split;

/// Outcome of one training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub unified_rows: usize,
    pub training_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub metrics: Metrics,
    /// Mean |SHAP| per feature, descending
    pub importances: Vec<FeatureImportance>,
    /// Margin of the average training row
    pub expected_value: f64,
    pub model: Model,
    pub model_hash: String,
    pub model_path: Option<PathBuf>,
}

/// Load the unified file named by the config and train on it.
#[instrument(skip(config), fields(input = %config.input.display()))]
pub fn run(config: &TrainingConfig) -> Result<TrainingReport> {
    let rows = read_unified(&config.input)?;
    train_on_records(config, &rows)
}

/// Train and evaluate on already loaded unified rows.
#[instrument(skip_all, fields(rows = rows.len(), seed = config.seed))]
pub fn train_on_records(config: &TrainingConfig, rows: &[UnifiedRecord]) -> Result<TrainingReport> {
    let labeled = label_received(rows);
    let table = build_training_set(&labeled);

    let split = train_test_split(table.len(), config.test_fraction, config.seed)?;
    let train = table.select(&split.train);
    let test = table.select(&split.test);
    if train.is_empty() {
        return Err(TrainerError::EmptyTrainingSet {
            table_rows: table.len(),
            test_fraction: config.test_fraction,
        });
    }
    info!("Split: {} train / {} test", train.len(), test.len());

    let names = feature_names();
    let model = GbdtTrainer::new(config.gbdt.clone()).train(&train.features, &train.labels, &names)?;

    if test.is_empty() {
        warn!("Test partition is empty; metrics default to 0");
    }
    let metrics = Metrics::evaluate(&test.labels, &model.predict_batch(&test.features));

    let explainer = TreeExplainer::new(&model);
    let shap = explainer.shap_matrix(&train.features);
    let importances = mean_abs_importance(&names, &shap);
    log_report(&importances);

    if let Some(path) = &config.shap_output {
        write_shap_csv(path, &names, &train.keys, &shap)?;
    }

    let (model_path, model_hash) = match &config.model_output {
        Some(dir) => {
            let (path, hash) = model.write_artifacts(dir)?;
            (Some(path), hash)
        }
        None => (None, model.hash_hex()?),
    };

    Ok(TrainingReport {
        unified_rows: rows.len(),
        training_rows: table.len(),
        train_rows: train.len(),
        test_rows: test.len(),
        metrics,
        importances,
        expected_value: explainer.expected_value(),
        model_hash,
        model_path,
        model,
    })
}
