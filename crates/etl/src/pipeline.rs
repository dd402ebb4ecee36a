//! End-to-end unification run

use offerlab_types::UnifiedRecord;
use std::path::PathBuf;
use tracing::{info, instrument};

use crate::config::EtlConfig;
use crate::errors::Result;
use crate::ingest::read_records;
use crate::normalize::{
    normalize_offers, normalize_profiles, normalize_transactions, RawOffer, RawProfile, RawTransaction,
};
use crate::unify::{unify, JoinStats};
use crate::writer::write_unified;

/// Outcome of one unification run
#[derive(Debug, Clone, PartialEq)]
pub struct EtlSummary {
    pub transactions: usize,
    pub profiles: usize,
    pub offers: usize,
    pub join: JoinStats,
    pub output: PathBuf,
}

/// Read, normalize and join the three inputs without writing anything.
#[instrument(skip(config))]
pub fn build_unified(config: &EtlConfig) -> Result<(Vec<UnifiedRecord>, EtlSummary)> {
    let raw_transactions: Vec<RawTransaction> = read_records(&config.transactions_path())?;
    let raw_profiles: Vec<RawProfile> = read_records(&config.profiles_path())?;
    let raw_offers: Vec<RawOffer> = read_records(&config.offers_path())?;

    info!(
        "Loaded {} transactions, {} profiles, {} offers",
        raw_transactions.len(),
        raw_profiles.len(),
        raw_offers.len()
    );

    let transactions = normalize_transactions(raw_transactions);
    let profiles = normalize_profiles(raw_profiles);
    let offers = normalize_offers(raw_offers);

    let (rows, join) = unify(&transactions, &profiles, &offers)?;

    let summary = EtlSummary {
        transactions: transactions.len(),
        profiles: profiles.len(),
        offers: offers.len(),
        join,
        output: config.output.clone(),
    };
    Ok((rows, summary))
}

/// Run the whole stage and write the unified file.
#[instrument(skip(config))]
pub fn run(config: &EtlConfig) -> Result<EtlSummary> {
    let (rows, summary) = build_unified(config)?;
    write_unified(&config.output, &rows)?;
    Ok(summary)
}
