//! Core domain types for book rating data.
//!
//! This module defines the fundamental data structures used throughout the system.
//! Key Rust concepts demonstrated here:
//! - Type aliases for domain clarity (UserId, ItemId)
//! - `Option<T>` for fields that may be missing in raw data
//! - Enums with data for the matrix cell (rated vs. absent)
//! - HashMap for identifier -> position lookups

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================
// Reviewer names and book titles are both plain strings in the source data.
// The aliases keep signatures honest about which one a function expects.

/// Identifier for a user (a reviewer name in the GoodReads export)
pub type UserId = String;

/// Identifier for an item (a book title in the GoodReads export)
pub type ItemId = String;

// =============================================================================
// Rating Records
// =============================================================================

/// A rating as it arrives from the data source, before conditioning.
///
/// Any field may be missing. Conditioning drops records that are not
/// complete; see [`RawRecord::complete`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub user_id: Option<UserId>,
    pub item_id: Option<ItemId>,
    pub rating: Option<f32>,
}

impl RawRecord {
    /// Create a raw record with every field present
    pub fn new(user_id: impl Into<UserId>, item_id: impl Into<ItemId>, rating: f32) -> Self {
        Self {
            user_id: Some(user_id.into()),
            item_id: Some(item_id.into()),
            rating: Some(rating),
        }
    }

    /// Convert into a [`RatingRecord`] if all three fields are present.
    ///
    /// Identifiers are trimmed; an identifier that is empty after trimming
    /// counts as missing. A non-finite rating counts as missing too.
    pub fn complete(self) -> Option<RatingRecord> {
        let user_id = non_blank(self.user_id?)?;
        let item_id = non_blank(self.item_id?)?;
        let rating = self.rating.filter(|r| r.is_finite())?;
        Some(RatingRecord {
            user_id,
            item_id,
            rating,
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

/// A complete (user, item, rating) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub user_id: UserId,
    pub item_id: ItemId,
    /// Rating value, 1.0 to 5.0 on the default scale
    pub rating: f32,
}

impl RatingRecord {
    pub fn new(user_id: impl Into<UserId>, item_id: impl Into<ItemId>, rating: f32) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            rating,
        }
    }
}

// =============================================================================
// Loading Types
// =============================================================================

/// Header names of the three columns we read from a ratings CSV.
///
/// Defaults match the GoodReads review export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvColumns {
    pub user: String,
    pub item: String,
    pub rating: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            user: "reviewerName".to_string(),
            item: "title".to_string(),
            rating: "reviewerRatings".to_string(),
        }
    }
}

/// Result of reading a ratings file
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Records that could be read, with possibly missing fields
    pub records: Vec<RawRecord>,
    /// Data lines seen (header excluded)
    pub total_lines: usize,
    /// Data lines skipped because they were malformed
    pub skipped_lines: usize,
}

// =============================================================================
// Matrix Types
// =============================================================================

/// One cell of the rating matrix.
///
/// Rust concept: An enum makes "no rating" a distinct state. `Absent` can
/// never be confused with `Rated(0.0)`, which a NaN or zero sentinel would allow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Absent,
    Rated(f32),
}

impl Cell {
    /// The rating stored in this cell, if any
    pub fn rating(self) -> Option<f32> {
        match self {
            Cell::Rated(value) => Some(value),
            Cell::Absent => None,
        }
    }

    pub fn is_absent(self) -> bool {
        matches!(self, Cell::Absent)
    }
}

/// Aggregate statistics for one item (matrix column)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStats {
    pub item_id: ItemId,
    pub avg_rating: f32,
    pub rating_count: u32,
    /// Popularity score derived from rating count and average
    pub popularity_score: f32,
}

// =============================================================================
// RatingMatrix - users x items
// =============================================================================

/// Users x items rating matrix.
///
/// Rows are users and columns are items, both sorted by identifier so that
/// positions are stable for a given set of records. Every in-range cell is
/// either [`Cell::Rated`] or [`Cell::Absent`].
///
/// Only rated entries are stored: one list per row and one per column,
/// ordered by position. A cell lookup is a binary search in its row, so
/// memory grows with the number of ratings, not with users x items.
///
/// Built with [`RatingMatrix::from_records`]; immutable afterwards.
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    pub(crate) users: Vec<UserId>,
    pub(crate) items: Vec<ItemId>,
    pub(crate) user_index: HashMap<UserId, usize>,
    pub(crate) item_index: HashMap<ItemId, usize>,

    /// Rated entries per user: (column, rating), ascending column
    pub(crate) rows: Vec<Vec<(usize, f32)>>,
    /// Rated entries per item: (row, rating), ascending row
    pub(crate) columns: Vec<Vec<(usize, f32)>>,
}

impl RatingMatrix {
    /// (number of users, number of items)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.users.len(), self.items.len())
    }

    /// All user identifiers in row order
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// All item identifiers in column order
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Row index of a user
    pub fn user_position(&self, user_id: &str) -> Option<usize> {
        self.user_index.get(user_id).copied()
    }

    /// Column index of an item
    pub fn item_position(&self, item_id: &str) -> Option<usize> {
        self.item_index.get(item_id).copied()
    }

    /// User identifier at a row index
    pub fn user_id(&self, row: usize) -> Option<&str> {
        self.users.get(row).map(String::as_str)
    }

    /// Item identifier at a column index
    pub fn item_id(&self, column: usize) -> Option<&str> {
        self.items.get(column).map(String::as_str)
    }

    /// Cell by position, `None` when out of bounds
    pub fn cell(&self, row: usize, column: usize) -> Option<Cell> {
        if row >= self.users.len() || column >= self.items.len() {
            return None;
        }
        let entries = &self.rows[row];
        let cell = match entries.binary_search_by_key(&column, |&(c, _)| c) {
            Ok(idx) => Cell::Rated(entries[idx].1),
            Err(_) => Cell::Absent,
        };
        Some(cell)
    }

    /// Cell by identifiers, `None` when either identifier is unknown
    pub fn get(&self, user_id: &str, item_id: &str) -> Option<Cell> {
        let row = self.user_position(user_id)?;
        let column = self.item_position(item_id)?;
        self.cell(row, column)
    }

    /// Rating by identifiers; `None` for unknown identifiers and absent cells
    pub fn rating(&self, user_id: &str, item_id: &str) -> Option<f32> {
        self.get(user_id, item_id).and_then(Cell::rating)
    }

    /// Rated entries of a user row as (column, rating)
    ///
    /// Returns an empty slice for an out-of-range row
    pub fn row(&self, row: usize) -> &[(usize, f32)] {
        self.rows.get(row).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Rated entries of an item column as (row, rating)
    pub fn column(&self, column: usize) -> &[(usize, f32)] {
        self.columns
            .get(column)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of non-absent cells
    pub fn rated_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    /// Fraction of cells that hold a rating
    pub fn density(&self) -> f64 {
        let total = self.users.len() * self.items.len();
        if total == 0 {
            0.0
        } else {
            self.rated_count() as f64 / total as f64
        }
    }
}
