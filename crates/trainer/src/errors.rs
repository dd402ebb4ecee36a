use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the modeling stage.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: invalid unified row: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("no training rows: {table_rows} labeled rows after filtering, test_fraction {test_fraction} left none for training")]
    EmptyTrainingSet { table_rows: usize, test_fraction: f64 },

    #[error("invalid split: {0}")]
    InvalidSplit(String),

    #[error("model error: {0}")]
    Gbdt(#[from] offerlab_gbdt::GbdtError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
