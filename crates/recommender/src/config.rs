//! Recommender configuration.

use crate::error::{RecommendError, Result};
use crate::similarity::{MIN_CO_RATERS, SimilarityMetric};
use serde::{Deserialize, Serialize};

/// Options shared by the item-based and user-based recommenders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    pub similarity_metric: SimilarityMetric,
    /// Length of a recommendation list (>= 1)
    pub top_k: usize,
    /// Fewest co-raters (or co-rated items) for a similarity to be defined (>= 2)
    pub min_co_raters: usize,
    /// Precompute the all-pairs item similarity table up front
    pub cache_similarities: bool,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            similarity_metric: SimilarityMetric::Cosine,
            top_k: 10,
            min_co_raters: 2,
            cache_similarities: false,
        }
    }
}

impl RecommenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k < 1 {
            return Err(RecommendError::InvalidConfig(
                "top_k must be at least 1".to_string(),
            ));
        }
        if self.min_co_raters < MIN_CO_RATERS {
            return Err(RecommendError::InvalidConfig(format!(
                "min_co_raters must be at least {MIN_CO_RATERS}, got {}",
                self.min_co_raters
            )));
        }
        Ok(())
    }
}
