//! Filter to enforce the rating scale.

use crate::error::Result;
use crate::traits::RecordFilter;
use data_loader::RatingRecord;

/// Removes records whose rating falls outside `[min, max]`.
pub struct RatingScaleFilter {
    min: f32,
    max: f32,
}

impl RatingScaleFilter {
    /// Create a new RatingScaleFilter.
    ///
    /// # Arguments
    /// * `min` - Lowest valid rating (typically 1.0)
    /// * `max` - Highest valid rating (typically 5.0)
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

impl RecordFilter for RatingScaleFilter {
    fn name(&self) -> &str {
        "RatingScaleFilter"
    }

    fn apply(&self, records: Vec<RatingRecord>) -> Result<Vec<RatingRecord>> {
        let filtered: Vec<RatingRecord> = records
            .into_iter()
            .filter(|record| record.rating >= self.min && record.rating <= self.max)
            .collect();
        Ok(filtered)
    }
}
