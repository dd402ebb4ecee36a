//! offerlab ETL - dataset unification
//!
//! Normalizes the raw transaction, profile and offer streams and left-joins
//! them into one flat CSV table.

pub mod config;
pub mod errors;
pub mod ingest;
pub mod normalize;
pub mod pipeline;
pub mod unify;
pub mod writer;

pub use config::EtlConfig;
pub use errors::EtlError;
pub use pipeline::{build_unified, run, EtlSummary};
pub use unify::{unify, JoinStats};
pub use writer::write_unified;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
