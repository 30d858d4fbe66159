//! Error types for the data-loader crate.
//!
//! Covers both halves of the crate: reading a ratings file and pivoting
//! conditioned records into a [`RatingMatrix`](crate::RatingMatrix).

use thiserror::Error;

/// Errors that can occur while loading ratings or building the rating matrix
///
/// Rust concept: The `#[derive(Error)]` macro from thiserror implements
/// `std::error::Error` and `Display` from the `#[error(...)]` attributes
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader failed in a way that cannot be skipped (bad header, I/O)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A configured column name is not present in the header row
    #[error("Missing column '{column}' in header")]
    MissingColumn { column: String },

    /// Two records map to the same (user, item) cell with different values
    ///
    /// The matrix never overwrites a cell silently; the caller has to
    /// resolve the conflict upstream.
    #[error(
        "Duplicate rating for user '{user_id}' and item '{item_id}': {existing} conflicts with {conflicting}"
    )]
    DuplicateRating {
        user_id: String,
        item_id: String,
        existing: f32,
        conflicting: f32,
    },

    /// Nothing left to build a matrix from
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
