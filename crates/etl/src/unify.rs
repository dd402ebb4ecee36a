//! Left hash joins of transactions onto profiles and offers
//!
//! The right-hand tables are indexed once; each transaction then looks up
//! both indexes. Output order and row count follow the transaction table.

use offerlab_types::{Offer, Profile, TransactionEvent, UnifiedRecord};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::errors::{EtlError, Result};

/// Join statistics, reported after unification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub rows: usize,
    pub profile_matches: usize,
    pub offer_matches: usize,
}

/// Index rows by key, rejecting duplicates so the left join cannot fan out.
pub fn index_unique<'a, T, F>(rows: &'a [T], table: &'static str, key: F) -> Result<HashMap<&'a str, &'a T>>
where
    F: Fn(&'a T) -> &'a str,
{
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        let k = key(row);
        if index.insert(k, row).is_some() {
            return Err(EtlError::DuplicateKey {
                table,
                key: k.to_string(),
            });
        }
    }
    Ok(index)
}

/// Left join `transactions` → `profiles` on `account_id`, then → `offers` on `offer_id`.
pub fn unify(
    transactions: &[TransactionEvent],
    profiles: &[Profile],
    offers: &[Offer],
) -> Result<(Vec<UnifiedRecord>, JoinStats)> {
    let profile_index = index_unique(profiles, "profile", |p| p.account_id.as_str())?;
    let offer_index = index_unique(offers, "offer", |o| o.offer_id.as_str())?;

    let mut stats = JoinStats {
        rows: transactions.len(),
        ..Default::default()
    };

    let rows: Vec<UnifiedRecord> = transactions
        .iter()
        .map(|tx| {
            let profile = profile_index.get(tx.account_id.as_str()).copied();
            let offer = tx
                .offer_id
                .as_deref()
                .and_then(|id| offer_index.get(id).copied());

            stats.profile_matches += usize::from(profile.is_some());
            stats.offer_matches += usize::from(offer.is_some());

            UnifiedRecord::join(tx, profile, offer)
        })
        .collect();

    info!(
        "Unified {} rows ({} with profile, {} with offer)",
        stats.rows, stats.profile_matches, stats.offer_matches
    );
    if stats.profile_matches < stats.rows {
        debug!(
            "{} transactions reference an unknown account",
            stats.rows - stats.profile_matches
        );
    }

    Ok((rows, stats))
}
