//! Filters for minimum activity thresholds.
//!
//! Items with very few raters (and users with very few ratings) add noise
//! to similarity scores and blow up the matrix size without adding
//! evidence. These filters drop them.

use crate::error::Result;
use crate::traits::RecordFilter;
use data_loader::RatingRecord;
use std::collections::{HashMap, HashSet};

/// Removes all records of items rated by fewer than `min_count` distinct users.
pub struct MinimumItemRatingsFilter {
    min_count: usize,
}

impl MinimumItemRatingsFilter {
    /// Create a new MinimumItemRatingsFilter.
    ///
    /// # Arguments
    /// * `min_count` - Minimum number of distinct raters an item needs
    pub fn new(min_count: usize) -> Self {
        Self { min_count }
    }
}

impl RecordFilter for MinimumItemRatingsFilter {
    fn name(&self) -> &str {
        "MinimumItemRatingsFilter"
    }

    fn apply(&self, records: Vec<RatingRecord>) -> Result<Vec<RatingRecord>> {
        let keep: Vec<bool> = {
            let counts = distinct_counts(&records, |r| (&r.item_id, &r.user_id));
            records
                .iter()
                .map(|r| counts[r.item_id.as_str()] >= self.min_count)
                .collect()
        };
        Ok(retain_flagged(records, keep))
    }
}

/// Removes all records of users who rated fewer than `min_count` distinct items.
pub struct MinimumUserRatingsFilter {
    min_count: usize,
}

impl MinimumUserRatingsFilter {
    pub fn new(min_count: usize) -> Self {
        Self { min_count }
    }
}

impl RecordFilter for MinimumUserRatingsFilter {
    fn name(&self) -> &str {
        "MinimumUserRatingsFilter"
    }

    fn apply(&self, records: Vec<RatingRecord>) -> Result<Vec<RatingRecord>> {
        if self.min_count == 0 {
            return Ok(records);
        }
        let keep: Vec<bool> = {
            let counts = distinct_counts(&records, |r| (&r.user_id, &r.item_id));
            records
                .iter()
                .map(|r| counts[r.user_id.as_str()] >= self.min_count)
                .collect()
        };
        Ok(retain_flagged(records, keep))
    }
}

/// For each key, the number of distinct partners it appears with.
///
/// `pair` returns (key, partner); e.g. (item, user) counts distinct raters per item.
fn distinct_counts<'a>(
    records: &'a [RatingRecord],
    pair: impl Fn(&'a RatingRecord) -> (&'a String, &'a String),
) -> HashMap<&'a str, usize> {
    let mut partners: HashMap<&'a str, HashSet<&'a str>> = HashMap::new();
    for record in records {
        let (key, partner) = pair(record);
        partners
            .entry(key.as_str())
            .or_default()
            .insert(partner.as_str());
    }
    partners
        .into_iter()
        .map(|(key, set)| (key, set.len()))
        .collect()
}

fn retain_flagged(records: Vec<RatingRecord>, keep: Vec<bool>) -> Vec<RatingRecord> {
    records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, kept)| kept.then_some(record))
        .collect()
}
