//! Error types for boosted-tree training and inference

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GbdtError {
    /// Training was asked to fit zero samples
    #[error("cannot train on an empty dataset")]
    EmptyDataset,

    #[error("row {row}: expected {expected} features, got {got}")]
    ShapeMismatch { row: usize, expected: usize, got: usize },

    #[error("{features} feature rows but {labels} labels")]
    LabelCountMismatch { features: usize, labels: usize },

    #[error("row {row}: label {value} is not 0 or 1")]
    InvalidLabel { row: usize, value: f64 },

    #[error("invalid training parameters: {0}")]
    InvalidConfig(String),

    #[error("model validation failed: {0}")]
    ValidationFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GbdtError>;
