//! Core traits for the conditioning pipeline.
//!
//! This module defines the RecordFilter trait that allows composable
//! conditioning stages to be applied to rating records.

use crate::error::Result;
use data_loader::RatingRecord;

/// One conditioning stage.
///
/// All stages must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows a built pipeline to be shared across threads
/// - Filters take ownership of the Vec<RatingRecord> and return a filtered Vec
/// - Filters must keep the relative order of the records they keep
pub trait RecordFilter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of records.
    ///
    /// # Arguments
    /// * `records` - The records to filter (takes ownership)
    ///
    /// # Returns
    /// * `Ok(Vec<RatingRecord>)` - The records that pass this stage
    /// * `Err` - If filtering fails
    fn apply(&self, records: Vec<RatingRecord>) -> Result<Vec<RatingRecord>>;
}
