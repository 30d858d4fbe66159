//! Filter to de-duplicate (user, item) pairs.
//!
//! A review export can hold the same reviewer rating the same title many
//! times. What happens to those repeats depends on the [`DuplicatePolicy`].

use crate::config::DuplicatePolicy;
use crate::error::Result;
use crate::traits::RecordFilter;
use data_loader::RatingRecord;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Collapses repeated (user, item) records according to a policy.
///
/// ## Algorithm
/// - `Reject`: drop a record if an identical (user, item, rating) record was
///   already kept. Pairs with *different* ratings all stay, and are counted
///   and logged, so the matrix builder can refuse them.
/// - `KeepFirst`: keep the first record of each pair.
/// - `KeepLast`: keep the last record of each pair, at its original position.
pub struct DeduplicateFilter {
    policy: DuplicatePolicy,
}

impl DeduplicateFilter {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self { policy }
    }
}

impl RecordFilter for DeduplicateFilter {
    fn name(&self) -> &str {
        "DeduplicateFilter"
    }

    fn apply(&self, records: Vec<RatingRecord>) -> Result<Vec<RatingRecord>> {
        let keep = match self.policy {
            DuplicatePolicy::Reject => keep_distinct_ratings(&records),
            DuplicatePolicy::KeepFirst => keep_first_per_pair(records.iter()),
            DuplicatePolicy::KeepLast => {
                let mut keep = keep_first_per_pair(records.iter().rev());
                keep.reverse();
                keep
            }
        };

        let filtered: Vec<RatingRecord> = records
            .into_iter()
            .zip(keep)
            .filter_map(|(record, kept)| kept.then_some(record))
            .collect();
        Ok(filtered)
    }
}

/// One flag per record: true for the first record of its (user, item) pair
fn keep_first_per_pair<'a>(records: impl Iterator<Item = &'a RatingRecord>) -> Vec<bool> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    records
        .map(|r| seen.insert((r.user_id.as_str(), r.item_id.as_str())))
        .collect()
}

/// One flag per record: true unless an identical record came earlier
fn keep_distinct_ratings(records: &[RatingRecord]) -> Vec<bool> {
    let mut seen: HashSet<(&str, &str, u32)> = HashSet::new();
    let mut ratings_per_pair: HashMap<(&str, &str), HashSet<u32>> = HashMap::new();

    let keep: Vec<bool> = records
        .iter()
        .map(|r| {
            let bits = r.rating.to_bits();
            ratings_per_pair
                .entry((r.user_id.as_str(), r.item_id.as_str()))
                .or_default()
                .insert(bits);
            seen.insert((r.user_id.as_str(), r.item_id.as_str(), bits))
        })
        .collect();

    let conflicting = ratings_per_pair.values().filter(|r| r.len() > 1).count();
    if conflicting > 0 {
        warn!(
            conflicting_pairs = conflicting,
            "Found (user, item) pairs with conflicting ratings"
        );
    }
    keep
}
