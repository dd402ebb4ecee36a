//! Offer-completion labels
//!
//! Each `offer received` row is labeled 1 when the same account has at
//! least one `offer completed` row for the same offer, else 0. Completed
//! pairs are collected into a set once, so labeling is linear and never
//! multiplies rows.

use offerlab_types::{EventKind, UnifiedRecord};
use std::collections::HashSet;
use tracing::debug;

/// A received offer with its completion label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledRecord<'a> {
    pub record: &'a UnifiedRecord,
    pub offer_completed: u8,
}

/// `(account_id, offer_id)` pairs with at least one completion
pub fn completed_pairs(rows: &[UnifiedRecord]) -> HashSet<(&str, &str)> {
    rows.iter()
        .filter(|row| row.event == EventKind::OfferCompleted)
        .filter_map(|row| Some((row.account_id.as_str(), row.offer_id.as_deref()?)))
        .collect()
}

/// Label every received row, in input order.
pub fn label_received(rows: &[UnifiedRecord]) -> Vec<LabeledRecord<'_>> {
    let completed = completed_pairs(rows);

    let labeled: Vec<LabeledRecord<'_>> = rows
        .iter()
        .filter(|row| row.event == EventKind::OfferReceived)
        .map(|record| {
            // A received row without an offer id can never match.
            let hit = record
                .offer_id
                .as_deref()
                .is_some_and(|offer_id| completed.contains(&(record.account_id.as_str(), offer_id)));
            LabeledRecord {
                record,
                offer_completed: u8::from(hit),
            }
        })
        .collect();

    debug!(
        "Labeled {} received offers against {} completed pairs ({} positive)",
        labeled.len(),
        completed.len(),
        labeled.iter().filter(|l| l.offer_completed == 1).count()
    );
    labeled
}
