//! offerlab training CLI
//!
//! Trains the offer-completion classifier on the unified CSV and reports
//! test metrics and feature importance.

use anyhow::{Context, Result};
use clap::Parser;
use offerlab_trainer::TrainingConfig;
use offerlab_types::init_tracing;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "offer-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and evaluate the offer-completion classifier", long_about = None)]
struct Args {
    /// TOML config file with a [training] table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Unified CSV produced by offer-etl
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Share of rows held out for evaluation
    #[arg(long)]
    test_fraction: Option<f64>,

    /// Seed for the train/test shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Number of boosting trees
    #[arg(long)]
    trees: Option<usize>,

    /// Maximum tree depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Shrinkage applied to every tree
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Write per-row SHAP values to this CSV
    #[arg(long)]
    shap_output: Option<PathBuf>,

    /// Write model.json and model.hash into this directory
    #[arg(long)]
    model_output: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(self, config: &mut TrainingConfig) {
        if let Some(path) = self.input {
            config.input = path;
        }
        if let Some(fraction) = self.test_fraction {
            config.test_fraction = fraction;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(trees) = self.trees {
            config.gbdt.num_trees = trees;
        }
        if let Some(depth) = self.max_depth {
            config.gbdt.max_depth = depth;
        }
        if let Some(rate) = self.learning_rate {
            config.gbdt.learning_rate = rate;
        }
        if self.shap_output.is_some() {
            config.shap_output = self.shap_output;
        }
        if self.model_output.is_some() {
            config.model_output = self.model_output;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose).context("Failed to set tracing subscriber")?;

    info!("offerlab trainer v{}", env!("CARGO_PKG_VERSION"));
    info!("═══════════════════════════════════════════");

    let mut config = TrainingConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);

    info!("Training configuration:");
    info!("  Input: {}", config.input.display());
    info!("  Test fraction: {}", config.test_fraction);
    info!("  Seed: {}", config.seed);
    info!("  Trees: {}", config.gbdt.num_trees);
    info!("  Max depth: {}", config.gbdt.max_depth);
    info!("  Learning rate: {}", config.gbdt.learning_rate);

    let report = offerlab_trainer::run(&config).context("Training failed")?;

    info!("═══════════════════════════════════════════");
    info!("✓ Training completed");
    info!("  Rows: {} train / {} test", report.train_rows, report.test_rows);
    info!("  accuracy:  {:.4}", report.metrics.accuracy);
    info!("  precision: {:.4}", report.metrics.precision);
    info!("  recall:    {:.4}", report.metrics.recall);
    info!("  f1:        {:.4}", report.metrics.f1);
    info!("  Model hash: {}", report.model_hash);
    if let Some(path) = &report.model_path {
        info!("  Model: {}", path.display());
    }

    Ok(())
}
