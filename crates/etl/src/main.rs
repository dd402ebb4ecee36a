//! offerlab ETL CLI
//!
//! Joins raw transactions, profiles and offers into the unified CSV.

use anyhow::{Context, Result};
use clap::Parser;
use offerlab_etl::EtlConfig;
use offerlab_types::init_tracing;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "offer-etl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Unify offer transactions, profiles and offers into one CSV", long_about = None)]
struct Args {
    /// TOML config file with an [etl] table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the raw inputs
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Transactions file, relative to the input directory
    #[arg(long)]
    transactions: Option<PathBuf>,

    /// Profiles file, relative to the input directory
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Offers file, relative to the input directory
    #[arg(long)]
    offers: Option<PathBuf>,

    /// Unified CSV output path (overwritten)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(self, config: &mut EtlConfig) {
        if let Some(dir) = self.input_dir {
            config.input_dir = dir;
        }
        if let Some(path) = self.transactions {
            config.transactions = path;
        }
        if let Some(path) = self.profiles {
            config.profiles = path;
        }
        if let Some(path) = self.offers {
            config.offers = path;
        }
        if let Some(path) = self.output {
            config.output = path;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose).context("Failed to set tracing subscriber")?;

    info!("offerlab ETL v{}", env!("CARGO_PKG_VERSION"));

    let mut config = EtlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);

    info!("Transactions: {}", config.transactions_path().display());
    info!("Profiles:     {}", config.profiles_path().display());
    info!("Offers:       {}", config.offers_path().display());

    let summary = offerlab_etl::run(&config).context("Unification failed")?;

    info!("✓ Unification completed");
    info!("  Rows:   {}", summary.join.rows);
    info!("  Output: {}", summary.output.display());

    Ok(())
}
