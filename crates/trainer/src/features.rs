//! Feature selection and encoding
//!
//! Informational offers are dropped, categoricals are one-hot encoded over
//! fixed vocabularies and missing numerics are carried as `NaN` for the
//! tree learner's default directions.

use offerlab_types::UnifiedRecord;
use rayon::prelude::*;
use tracing::info;

use crate::labels::LabeledRecord;

/// Offer type excluded from training
pub const INFORMATIONAL: &str = "informational";

pub const GENDERS: [&str; 3] = ["F", "M", "O"];
pub const OFFER_TYPES: [&str; 2] = ["bogo", "discount"];

/// Model input columns, in matrix order
pub const FEATURE_COLUMNS: [&str; 15] = [
    "age",
    "credit_card_limit",
    "reward",
    "discount_value",
    "duration",
    "min_value",
    "web",
    "email",
    "mobile",
    "social",
    "gender_F",
    "gender_M",
    "gender_O",
    "offer_type_bogo",
    "offer_type_discount",
];

pub fn feature_names() -> Vec<String> {
    FEATURE_COLUMNS.iter().map(|name| name.to_string()).collect()
}

/// Whether a row survives the informational filter. A null offer type is kept.
pub fn is_trainable(record: &UnifiedRecord) -> bool {
    record.offer_type.as_deref() != Some(INFORMATIONAL)
}

fn one_hot<const N: usize>(value: Option<&str>, vocabulary: [&str; N]) -> [f64; N] {
    vocabulary.map(|category| if value == Some(category) { 1.0 } else { 0.0 })
}

fn numeric(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::NAN)
}

fn flag(value: Option<u8>) -> f64 {
    value.map_or(f64::NAN, f64::from)
}

/// Feature vector in [`FEATURE_COLUMNS`] order
pub fn encode(record: &UnifiedRecord) -> Vec<f64> {
    let mut row = Vec::with_capacity(FEATURE_COLUMNS.len());
    row.extend([
        numeric(record.age),
        numeric(record.credit_card_limit),
        numeric(record.reward),
        numeric(record.discount_value),
        numeric(record.duration),
        numeric(record.min_value),
        flag(record.web),
        flag(record.email),
        flag(record.mobile),
        flag(record.social),
    ]);
    row.extend(one_hot(record.gender.as_deref(), GENDERS));
    row.extend(one_hot(record.offer_type.as_deref(), OFFER_TYPES));
    row
}

/// Encoded training table with the identity of each row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<f64>,
    /// `(account_id, offer_id)` per row
    pub keys: Vec<(String, Option<String>)>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Rows at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> TrainingSet {
        TrainingSet {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            keys: indices.iter().map(|&i| self.keys[i].clone()).collect(),
        }
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&y| y == 1.0).count()
    }
}

/// Filter labeled rows and encode them, preserving order.
pub fn build_training_set(labeled: &[LabeledRecord<'_>]) -> TrainingSet {
    let kept: Vec<&LabeledRecord<'_>> = labeled.iter().filter(|l| is_trainable(l.record)).collect();
    let features: Vec<Vec<f64>> = kept.par_iter().map(|l| encode(l.record)).collect();

    let set = TrainingSet {
        features,
        labels: kept.iter().map(|l| f64::from(l.offer_completed)).collect(),
        keys: kept
            .iter()
            .map(|l| (l.record.account_id.clone(), l.record.offer_id.clone()))
            .collect(),
    };

    info!(
        "Training table: {} rows ({} informational dropped), {} positive",
        set.len(),
        labeled.len() - kept.len(),
        set.positives()
    );
    set
}
