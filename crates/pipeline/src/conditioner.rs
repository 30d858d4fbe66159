//! Data conditioning: raw records in, clean records out.
//!
//! The conditioner runs a fixed sequence of stages:
//! 1. Drop incomplete records (missing user, item or rating)
//! 2. Drop non-ASCII identifiers (only when `ascii_only` is set)
//! 3. Drop ratings outside the rating scale
//! 4. De-duplicate (user, item) pairs
//! 5. Drop items below `min_ratings_per_item`
//! 6. Drop users below `min_ratings_per_user`
//!
//! Steps 5 and 6 run once each, in that order. Removing users in step 6 can
//! push an item back under the item threshold; the result is not iterated
//! to a fixed point.
//!
//! Under the default [`DuplicatePolicy::Reject`](crate::DuplicatePolicy),
//! step 4 only collapses exact repeats. Conflicting ratings for one
//! (user, item) pair pass through conditioning unchanged, and
//! `RatingMatrix::from_records` then fails with `DuplicateRating`. Pick
//! `KeepFirst` or `KeepLast` to resolve conflicts here instead.

use crate::config::ConditioningConfig;
use crate::error::{ConditioningError, Result};
use crate::filter_pipeline::{FilterPipeline, StageReport};
use crate::filters::*;
use data_loader::{RatingRecord, RawRecord};
use tracing::{info, instrument};

/// Name used in reports for the completeness stage
pub const COMPLETENESS_STAGE: &str = "CompleteRecords";

/// Output of a conditioning run
#[derive(Debug, Clone)]
pub struct Conditioned {
    pub records: Vec<RatingRecord>,
    /// Counts around every stage, completeness first
    pub stages: Vec<StageReport>,
}

/// Builds and runs the conditioning pipeline for a config.
pub struct Conditioner {
    config: ConditioningConfig,
    pipeline: FilterPipeline,
}

impl Conditioner {
    /// Create a conditioner, validating the config first
    pub fn new(config: ConditioningConfig) -> Result<Self> {
        config.validate()?;

        let mut pipeline = FilterPipeline::new();
        if config.ascii_only {
            pipeline = pipeline.add_filter(AsciiOnlyFilter);
        }
        let pipeline = pipeline
            .add_filter(RatingScaleFilter::new(config.rating_min, config.rating_max))
            .add_filter(DeduplicateFilter::new(config.duplicate_policy))
            .add_filter(MinimumItemRatingsFilter::new(config.min_ratings_per_item))
            .add_filter(MinimumUserRatingsFilter::new(config.min_ratings_per_user));

        Ok(Self { config, pipeline })
    }

    pub fn config(&self) -> &ConditioningConfig {
        &self.config
    }

    /// Condition raw records, returning only the surviving records
    pub fn condition(&self, raw: Vec<RawRecord>) -> Result<Vec<RatingRecord>> {
        self.condition_with_report(raw).map(|c| c.records)
    }

    /// Condition raw records and keep the per-stage counts
    ///
    /// # Errors
    /// `InsufficientData` when no record survives. The reason names the
    /// first stage that left nothing.
    #[instrument(skip(self, raw), fields(input = raw.len()))]
    pub fn condition_with_report(&self, raw: Vec<RawRecord>) -> Result<Conditioned> {
        let input = raw.len();

        let complete: Vec<RatingRecord> = raw.into_iter().filter_map(RawRecord::complete).collect();
        let mut stages = vec![StageReport {
            name: COMPLETENESS_STAGE.to_string(),
            input,
            output: complete.len(),
        }];

        let (records, reports) = self.pipeline.apply_with_report(complete)?;
        stages.extend(reports);

        if records.is_empty() {
            let reason = stages
                .iter()
                .find(|stage| stage.output == 0)
                .map(|stage| format!("no records left after {}", stage.name))
                .unwrap_or_else(|| "no input records".to_string());
            return Err(ConditioningError::InsufficientData { input, reason });
        }

        info!(
            input,
            output = records.len(),
            "Conditioned ratings"
        );
        Ok(Conditioned { records, stages })
    }
}
