//! Deterministic gradient boosted decision trees
//!
//! Binary log-loss boosting with exact-greedy CART splits, learned
//! default directions for missing values, TreeSHAP attribution and
//! canonical JSON model artifacts.
//!
//! Modules:
//! - `tree`: node and tree structures with missing-aware traversal
//! - `cart`: single-tree builder on gradients and hessians
//! - `trainer`: boosting loop and training configuration
//! - `model`: ensemble inference and artifact export
//! - `shap`: per-feature attributions
//! - `deterministic`: seeded RNG and split tie-breaking
//! - `serialization`: canonical JSON and hashing

pub mod cart;
pub mod deterministic;
pub mod errors;
pub mod model;
pub mod serialization;
pub mod shap;
pub mod trainer;
pub mod tree;

pub use deterministic::{LcgRng, SplitTieBreaker};
pub use errors::GbdtError;
pub use model::{sigmoid, Model, DECISION_THRESHOLD};
pub use shap::TreeExplainer;
pub use trainer::{log_loss, GbdtConfig, GbdtTrainer};
pub use tree::{Node, Tree};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
