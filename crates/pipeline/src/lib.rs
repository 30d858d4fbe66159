//! Conditioning pipeline for raw rating records.
//!
//! This crate provides:
//! - RecordFilter trait and implementations for record conditioning
//! - FilterPipeline for composing filters
//! - Conditioner, which runs the fixed conditioning sequence for a config
//!
//! ## Architecture
//! Records are processed in stages:
//! 1. Incomplete records are dropped (missing user, item or rating)
//! 2. Filters remove unusable records (non-ASCII, off-scale, duplicates)
//! 3. Activity thresholds remove low-activity items, then users
//! 4. An empty result is an error, never an empty record set
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{Conditioner, ConditioningConfig};
//!
//! let config = ConditioningConfig::default()
//!     .with_min_ratings_per_item(2)
//!     .with_min_ratings_per_user(1);
//!
//! let conditioner = Conditioner::new(config)?;
//! let records = conditioner.condition(raw_records)?;
//! ```

pub mod error;
pub mod config;
pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod conditioner;

// Re-export main types
pub use error::{ConditioningError, Result};
pub use config::{ConditioningConfig, DuplicatePolicy};
pub use traits::RecordFilter;
pub use filter_pipeline::{FilterPipeline, StageReport};
pub use conditioner::{Conditioned, Conditioner};
