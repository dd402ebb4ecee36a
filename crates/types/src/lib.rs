//! Shared records for the offerlab pipeline
//!
//! Both stages agree on these types: the ETL stage produces
//! [`UnifiedRecord`] rows and the trainer consumes them.
//!
//! Modules:
//! - `records`: normalized transaction, profile, offer and unified rows
//! - `telemetry`: tracing subscriber setup shared by the binaries

pub mod records;
pub mod telemetry;

pub use records::{EventKind, Offer, Profile, TransactionEvent, UnifiedRecord, CHANNELS, UNIFIED_COLUMNS};
pub use telemetry::init_tracing;

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
