//! RatingMatrix construction and derived lookups.
//!
//! This module pivots conditioned records into the rating matrix:
//! - Collect and sort the row (user) and column (item) identifier sets
//! - Group each record's rating into its row, rejecting conflicting duplicates
//! - Mirror the rows into per-column lists of rated entries
//! - Compute per-item statistics
//!
//! Rust concepts you'll learn:
//! - BTreeSet for sorted, de-duplicated identifier sets
//! - Pattern matching on enum cells with guards
//! - Merging two sorted slices without allocation per step
//! - Using Rayon for parallel processing

use crate::error::{DataLoadError, Result};
use crate::types::*;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

impl RatingMatrix {
    /// Build the matrix from conditioned records
    ///
    /// Steps:
    /// 1. Derive sorted user and item identifier sets
    /// 2. Map identifiers to row/column positions
    /// 3. Group ratings by row
    /// 4. Sort each row, failing on two different ratings for one cell
    /// 5. Mirror the rows into column lists
    ///
    /// A record repeated with the *same* rating is accepted: it encodes the
    /// same cell value, so nothing is overwritten.
    pub fn from_records(records: &[RatingRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(DataLoadError::InsufficientData(
                "no records to build a rating matrix from".to_string(),
            ));
        }

        // 1. Sorted identifier sets
        let users: Vec<UserId> = records
            .iter()
            .map(|r| r.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let items: Vec<ItemId> = records
            .iter()
            .map(|r| r.item_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        // 2. Identifier -> position
        let user_index: HashMap<UserId, usize> = users
            .iter()
            .enumerate()
            .map(|(pos, id)| (id.clone(), pos))
            .collect();
        let item_index: HashMap<ItemId, usize> = items
            .iter()
            .enumerate()
            .map(|(pos, id)| (id.clone(), pos))
            .collect();

        // 3. Rated entries per row, in record order
        let num_items = items.len();
        let mut rows: Vec<Vec<(usize, f32)>> = vec![Vec::new(); users.len()];
        for record in records {
            let row = user_index[&record.user_id];
            let column = item_index[&record.item_id];
            rows[row].push((column, record.rating));
        }

        // 4. Sort each row by column, then fold repeats of the same cell.
        //    The sort is stable, so the earlier record stays first.
        for (row, entries) in rows.iter_mut().enumerate() {
            entries.sort_by_key(|&(column, _)| column);
            let conflict = entries
                .windows(2)
                .find(|pair| pair[0].0 == pair[1].0 && pair[0].1 != pair[1].1)
                .map(|pair| (pair[0].0, pair[0].1, pair[1].1));
            if let Some((column, existing, conflicting)) = conflict {
                return Err(DataLoadError::DuplicateRating {
                    user_id: users[row].clone(),
                    item_id: items[column].clone(),
                    existing,
                    conflicting,
                });
            }
            entries.dedup_by_key(|&mut (column, _)| column);
        }

        // 5. Column lists, filled in row order so they stay sorted
        let mut columns: Vec<Vec<(usize, f32)>> = vec![Vec::new(); num_items];
        for (row, entries) in rows.iter().enumerate() {
            for &(column, value) in entries {
                columns[column].push((row, value));
            }
        }

        let matrix = Self {
            users,
            items,
            user_index,
            item_index,
            rows,
            columns,
        };

        info!(
            users = matrix.users.len(),
            items = matrix.items.len(),
            rated = matrix.rated_count(),
            "Built rating matrix"
        );
        Ok(matrix)
    }

    /// Rating pairs from the users who rated both columns (the co-raters).
    ///
    /// Each pair is `(rating of column_a, rating of column_b)`, ordered by
    /// row. Unknown columns yield no pairs.
    pub fn co_raters(&self, column_a: usize, column_b: usize) -> Vec<(f32, f32)> {
        merge_rated(self.column(column_a), self.column(column_b))
    }

    /// Rating pairs over the items both users rated.
    ///
    /// Each pair is `(rating by row_a, rating by row_b)`, ordered by column.
    pub fn co_rated_items(&self, row_a: usize, row_b: usize) -> Vec<(f32, f32)> {
        merge_rated(self.row(row_a), self.row(row_b))
    }

    /// Compute aggregate statistics for every item, in column order
    ///
    /// For each item, calculate:
    /// - Average rating
    /// - Rating count
    /// - Popularity score
    pub fn item_stats(&self) -> Vec<ItemStats> {
        let stats: Vec<ItemStats> = self
            .columns
            .par_iter()
            .enumerate()
            .map(|(column, ratings)| {
                let rating_count = ratings.len() as u32;
                let avg_rating = if rating_count > 0 {
                    let total: f32 = ratings.iter().map(|&(_, r)| r).sum();
                    total / rating_count as f32
                } else {
                    0.0
                };
                ItemStats {
                    item_id: self.items[column].clone(),
                    avg_rating,
                    rating_count,
                    popularity_score: compute_popularity_score(avg_rating, rating_count),
                }
            })
            .collect();
        debug!(items = stats.len(), "Computed item stats");
        stats
    }
}

/// Intersect two position-sorted entry lists
fn merge_rated(a: &[(usize, f32)], b: &[(usize, f32)]) -> Vec<(f32, f32)> {
    let mut pairs = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (pos_a, rating_a) = a[i];
        let (pos_b, rating_b) = b[j];
        if pos_a == pos_b {
            pairs.push((rating_a, rating_b));
            i += 1;
            j += 1;
        } else if pos_a < pos_b {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}

/// Helper function to compute popularity score
///
/// avg_rating * ln(rating_count + 1) rewards both high ratings and many ratings
fn compute_popularity_score(avg_rating: f32, rating_count: u32) -> f32 {
    avg_rating * (rating_count as f32 + 1.0).ln()
}
