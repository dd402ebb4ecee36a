//! Normalized record types
//!
//! All records are immutable once built. Optional fields model the nulls
//! that the left joins and the sparse event payloads produce.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Marketing channels an offer can be advertised through, in flag order.
pub const CHANNELS: [&str; 4] = ["web", "email", "mobile", "social"];

/// Column order of the unified flat file.
pub const UNIFIED_COLUMNS: [&str; 18] = [
    "account_id",
    "offer_id",
    "event",
    "time",
    "amount",
    "reward",
    "gender",
    "age",
    "credit_card_limit",
    "registered_on",
    "offer_type",
    "discount_value",
    "min_value",
    "duration",
    "web",
    "email",
    "mobile",
    "social",
];

/// Customer event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "transaction")]
    Transaction,
    #[serde(rename = "offer received")]
    OfferReceived,
    #[serde(rename = "offer viewed")]
    OfferViewed,
    #[serde(rename = "offer completed")]
    OfferCompleted,
}

/// One customer event with its payload flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEvent {
    pub account_id: String,
    pub event: EventKind,
    pub time: Option<f64>,
    pub amount: Option<f64>,
    pub offer_id: Option<String>,
    pub reward: Option<f64>,
}

/// One user profile, keyed by `account_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub account_id: String,
    pub gender: Option<String>,
    pub age: Option<f64>,
    pub credit_card_limit: Option<f64>,
    pub registered_on: Option<NaiveDate>,
}

/// One offer definition with channel membership expanded to 0/1 flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub offer_id: String,
    pub offer_type: Option<String>,
    pub discount_value: Option<f64>,
    pub min_value: Option<f64>,
    pub duration: Option<f64>,
    pub web: u8,
    pub email: u8,
    pub mobile: u8,
    pub social: u8,
}

/// A transaction left-joined with its profile and offer.
///
/// Field order is the flat-file column order ([`UNIFIED_COLUMNS`]). The
/// aliases accept the legacy `time_since_test_start` and `ammount` headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedRecord {
    pub account_id: String,
    #[serde(default)]
    pub offer_id: Option<String>,
    pub event: EventKind,
    #[serde(default, alias = "time_since_test_start")]
    pub time: Option<f64>,
    #[serde(default, alias = "ammount")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub reward: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<f64>,
    #[serde(default)]
    pub credit_card_limit: Option<f64>,
    #[serde(default)]
    pub registered_on: Option<NaiveDate>,
    #[serde(default)]
    pub offer_type: Option<String>,
    #[serde(default)]
    pub discount_value: Option<f64>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub web: Option<u8>,
    #[serde(default)]
    pub email: Option<u8>,
    #[serde(default)]
    pub mobile: Option<u8>,
    #[serde(default)]
    pub social: Option<u8>,
}

impl UnifiedRecord {
    /// Left-join a transaction with its (possibly missing) profile and offer.
    pub fn join(tx: &TransactionEvent, profile: Option<&Profile>, offer: Option<&Offer>) -> Self {
        Self {
            account_id: tx.account_id.clone(),
            offer_id: tx.offer_id.clone(),
            event: tx.event,
            time: tx.time,
            amount: tx.amount,
            reward: tx.reward,
            gender: profile.and_then(|p| p.gender.clone()),
            age: profile.and_then(|p| p.age),
            credit_card_limit: profile.and_then(|p| p.credit_card_limit),
            registered_on: profile.and_then(|p| p.registered_on),
            offer_type: offer.and_then(|o| o.offer_type.clone()),
            discount_value: offer.and_then(|o| o.discount_value),
            min_value: offer.and_then(|o| o.min_value),
            duration: offer.and_then(|o| o.duration),
            web: offer.map(|o| o.web),
            email: offer.map(|o| o.email),
            mobile: offer.map(|o| o.mobile),
            social: offer.map(|o| o.social),
        }
    }
}
