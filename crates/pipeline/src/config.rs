//! Conditioning configuration.
//!
//! Every field has a default, so a config file only needs the options it
//! changes:
//!
//! ```json
//! { "min_ratings_per_item": 5, "ascii_only": true }
//! ```

use crate::error::{ConditioningError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How to treat several records for the same (user, item) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Collapse exact repeats; leave conflicting ratings for the matrix
    /// builder to reject.
    #[default]
    Reject,
    /// Keep the first record seen for each pair
    KeepFirst,
    /// Keep the last record seen for each pair
    KeepLast,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DuplicatePolicy::Reject => "reject",
            DuplicatePolicy::KeepFirst => "keep_first",
            DuplicatePolicy::KeepLast => "keep_last",
        };
        f.write_str(name)
    }
}

impl FromStr for DuplicatePolicy {
    type Err = ConditioningError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "reject" => Ok(DuplicatePolicy::Reject),
            "keep_first" => Ok(DuplicatePolicy::KeepFirst),
            "keep_last" => Ok(DuplicatePolicy::KeepLast),
            other => Err(ConditioningError::InvalidConfig(format!(
                "unknown duplicate policy '{other}' (expected reject, keep_first or keep_last)"
            ))),
        }
    }
}

/// Thresholds and switches for [`Conditioner`](crate::Conditioner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditioningConfig {
    /// Items with fewer distinct raters are dropped (>= 1)
    pub min_ratings_per_item: usize,
    /// Users with fewer rated items are dropped, applied after the item filter
    pub min_ratings_per_user: usize,
    /// Lowest valid rating on the scale
    pub rating_min: f32,
    /// Highest valid rating on the scale
    pub rating_max: f32,
    /// Drop records whose user or item identifier contains non-ASCII characters
    pub ascii_only: bool,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for ConditioningConfig {
    fn default() -> Self {
        Self {
            min_ratings_per_item: 1,
            min_ratings_per_user: 0,
            rating_min: 1.0,
            rating_max: 5.0,
            ascii_only: false,
            duplicate_policy: DuplicatePolicy::Reject,
        }
    }
}

impl ConditioningConfig {
    pub fn with_min_ratings_per_item(mut self, min: usize) -> Self {
        self.min_ratings_per_item = min;
        self
    }

    pub fn with_min_ratings_per_user(mut self, min: usize) -> Self {
        self.min_ratings_per_user = min;
        self
    }

    pub fn with_rating_scale(mut self, min: f32, max: f32) -> Self {
        self.rating_min = min;
        self.rating_max = max;
        self
    }

    pub fn with_ascii_only(mut self, ascii_only: bool) -> Self {
        self.ascii_only = ascii_only;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Check that every value is in range
    pub fn validate(&self) -> Result<()> {
        if self.min_ratings_per_item < 1 {
            return Err(ConditioningError::InvalidConfig(
                "min_ratings_per_item must be at least 1".to_string(),
            ));
        }
        if !self.rating_min.is_finite() || !self.rating_max.is_finite() {
            return Err(ConditioningError::InvalidConfig(
                "rating scale bounds must be finite".to_string(),
            ));
        }
        if self.rating_min > self.rating_max {
            return Err(ConditioningError::InvalidConfig(format!(
                "rating_min ({}) is greater than rating_max ({})",
                self.rating_min, self.rating_max
            )));
        }
        Ok(())
    }
}
