//! # Data Loader Crate
//!
//! This crate holds the rating data model: reading a ratings file and
//! pivoting conditioned ratings into a users x items matrix.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (RawRecord, RatingRecord, Cell, RatingMatrix)
//! - **parser**: Parse a ratings CSV into raw records
//! - **matrix**: Build the RatingMatrix and its sparse lookups
//! - **error**: Error types for loading and matrix construction
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{parser, CsvColumns, RatingMatrix};
//! use std::path::Path;
//!
//! let report = parser::parse_ratings_csv(Path::new("data/br.csv"), &CsvColumns::default())?;
//!
//! // ... condition report.records with the pipeline crate ...
//!
//! let matrix = RatingMatrix::from_records(&conditioned)?;
//! let (users, items) = matrix.dimensions();
//! println!("{} users x {} items", users, items);
//! ```
//!
//! ## Learning Goals
//!
//! 1. **Ownership and Borrowing**: RatingMatrix owns the data, getters return `&str` / slices
//! 2. **Error Handling**: Using Result<T> and a custom error type
//! 3. **Type Safety**: `Cell::Absent` instead of a magic number for "no rating"
//! 4. **Collections**: BTreeSet for sorted identifiers, HashMap for positions
//! 5. **Parallel Processing**: Using Rayon for per-item statistics

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod matrix;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases
    UserId,
    ItemId,
    // Core types
    RawRecord,
    RatingRecord,
    Cell,
    RatingMatrix,
    ItemStats,
    // Loading
    CsvColumns,
    LoadReport,
};
