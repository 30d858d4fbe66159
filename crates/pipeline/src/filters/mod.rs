//! Filter implementations for the conditioning pipeline.
//!
//! This module contains all the concrete filters that can be composed
//! into a FilterPipeline.

pub mod ascii_only;
pub mod deduplicate;
pub mod minimum_ratings;
pub mod rating_scale;

// Re-export for convenience
pub use ascii_only::AsciiOnlyFilter;
pub use deduplicate::DeduplicateFilter;
pub use minimum_ratings::{MinimumItemRatingsFilter, MinimumUserRatingsFilter};
pub use rating_scale::RatingScaleFilter;
