//! The FilterPipeline orchestrates multiple record filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! conditioning stages together using the builder pattern.

use crate::error::Result;
use crate::traits::RecordFilter;
use data_loader::RatingRecord;
use serde::Serialize;

/// Record counts around one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub name: String,
    pub input: usize,
    pub output: usize,
}

impl StageReport {
    pub fn removed(&self) -> usize {
        self.input - self.output
    }
}

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(RatingScaleFilter::new(1.0, 5.0))
///     .add_filter(DeduplicateFilter::new(DuplicatePolicy::Reject))
///     .add_filter(MinimumItemRatingsFilter::new(2));
///
/// let filtered = pipeline.apply(records)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn RecordFilter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl RecordFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Names of the filters, in application order
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Apply all filters in sequence to the records.
    pub fn apply(&self, records: Vec<RatingRecord>) -> Result<Vec<RatingRecord>> {
        self.apply_with_report(records).map(|(records, _)| records)
    }

    /// Apply all filters and report the count before and after each one.
    ///
    /// ## Algorithm
    /// 1. Start with the input records
    /// 2. For each filter in order:
    ///    a. Log filter name and input count
    ///    b. Apply the filter
    ///    c. Log output count
    /// 3. Return final filtered set and the per-stage counts
    pub fn apply_with_report(
        &self,
        records: Vec<RatingRecord>,
    ) -> Result<(Vec<RatingRecord>, Vec<StageReport>)> {
        let mut current = records;
        let mut reports = Vec::with_capacity(self.filters.len());
        for filter in &self.filters {
            let input = current.len();
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                input
            );
            current = filter.apply(current)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
            reports.push(StageReport {
                name: filter.name().to_string(),
                input,
                output: current.len(),
            });
        }
        Ok((current, reports))
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
