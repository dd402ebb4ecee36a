//! Raw record shapes and their flat, normalized forms

use chrono::NaiveDate;
use offerlab_types::{EventKind, Offer, Profile, TransactionEvent, CHANNELS};
use rayon::prelude::*;
use serde::Deserialize;

use tracing::warn;

/// Transaction as it appears in the raw event stream
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    pub account_id: String,
    pub event: EventKind,
    #[serde(default, alias = "time_since_test_start")]
    pub time: Option<f64>,
    #[serde(default)]
    pub value: Option<RawEventValue>,
}

/// Nested event payload. The offer reference is spelled two ways.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEventValue {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub offer_id: Option<String>,
    #[serde(default, rename = "offer id")]
    pub offer_id_spaced: Option<String>,
    #[serde(default)]
    pub reward: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawProfile {
    pub id: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<f64>,
    #[serde(default)]
    pub credit_card_limit: Option<f64>,
    #[serde(default)]
    pub registered_on: Option<RawDate>,
}

/// `YYYYMMDD` date, encoded as a number or a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    Int(i64),
    Text(String),
}

impl RawDate {
    fn as_digits(&self) -> String {
        match self {
            RawDate::Int(v) => v.to_string(),
            RawDate::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOffer {
    pub id: String,
    #[serde(default)]
    pub offer_type: Option<String>,
    #[serde(default)]
    pub discount_value: Option<f64>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    /// Absent and `null` both mean no channels
    #[serde(default)]
    pub channels: Option<Vec<String>>,
}

/// Pick the offer reference: `offer_id` when non-empty, else `offer id`.
pub fn coalesce_offer_id(value: &RawEventValue) -> Option<String> {
    match value.offer_id.as_deref() {
        Some(id) if !id.is_empty() => Some(id.to_string()),
        _ => value.offer_id_spaced.clone(),
    }
}

pub fn normalize_transaction(raw: RawTransaction) -> TransactionEvent {
    let value = raw.value.unwrap_or_default();
    let offer_id = coalesce_offer_id(&value);

    TransactionEvent {
        account_id: raw.account_id,
        event: raw.event,
        time: raw.time,
        amount: value.amount,
        offer_id,
        reward: value.reward,
    }
}

/// Normalize the event stream in parallel, keeping input order.
pub fn normalize_transactions(raw: Vec<RawTransaction>) -> Vec<TransactionEvent> {
    raw.into_par_iter().map(normalize_transaction).collect()
}

/// Parse an 8-digit `YYYYMMDD` encoding.
pub fn parse_registered_on(raw: &RawDate) -> Option<NaiveDate> {
    let digits = raw.as_digits();
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(&digits, "%Y%m%d").ok()
}

/// Normalize one profile. A malformed `registered_on` becomes null and is logged.
pub fn normalize_profile(raw: RawProfile) -> Profile {
    let registered_on = raw.registered_on.as_ref().and_then(|date| {
        let parsed = parse_registered_on(date);
        if parsed.is_none() {
            warn!(
                "profile {}: invalid registered_on {:?} (expected YYYYMMDD), treating as null",
                raw.id,
                date.as_digits()
            );
        }
        parsed
    });

    Profile {
        account_id: raw.id,
        gender: raw.gender,
        age: raw.age,
        credit_card_limit: raw.credit_card_limit,
        registered_on,
    }
}

pub fn normalize_profiles(raw: Vec<RawProfile>) -> Vec<Profile> {
    raw.into_iter().map(normalize_profile).collect()
}

/// Expand `channels` into flags in [`CHANNELS`] order.
pub fn channel_flags(channels: &[String]) -> [u8; 4] {
    CHANNELS.map(|channel| u8::from(channels.iter().any(|c| c == channel)))
}

pub fn normalize_offer(raw: RawOffer) -> Offer {
    let [web, email, mobile, social] = channel_flags(raw.channels.as_deref().unwrap_or_default());

    Offer {
        offer_id: raw.id,
        offer_type: raw.offer_type,
        discount_value: raw.discount_value,
        min_value: raw.min_value,
        duration: raw.duration,
        web,
        email,
        mobile,
        social,
    }
}

pub fn normalize_offers(raw: Vec<RawOffer>) -> Vec<Offer> {
    raw.into_iter().map(normalize_offer).collect()
}
