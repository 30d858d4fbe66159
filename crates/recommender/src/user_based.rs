//! User-based collaborative filtering
//!
//! "Readers like you also liked these books."
//!
//! ## Algorithm
//! `top_matches`: score the query user against every other user over the
//! items both rated, with the same metric and co-rater rule as the item side.
//!
//! `recommend_for_user`: for every book the query user has not rated,
//! predict a rating as the similarity-weighted average of the ratings given
//! by neighbours:
//!
//! ```text
//! predicted(u, i) = Σ sim(u, v) · r(v, i) / Σ sim(u, v)
//! ```
//!
//! over users `v` with a defined, strictly positive similarity to `u` who
//! rated `i`. Users rated opposite to the query user never pull a
//! prediction.

use crate::config::RecommenderConfig;
use crate::error::{RecommendError, Result};
use crate::ranking::{Ranked, rank_and_truncate};
use crate::similarity::{MIN_CO_RATERS, SimilarityMetric, user_similarity};
use data_loader::{ItemId, RatingMatrix, UserId};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A similar user and how similar they are
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserMatch {
    pub user_id: UserId,
    pub score: f64,
}

impl Ranked for UserMatch {
    fn id(&self) -> &str {
        &self.user_id
    }

    fn score(&self) -> f64 {
        self.score
    }
}

/// A rating the query user would likely give an unrated book
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictedRating {
    pub item_id: ItemId,
    pub predicted_rating: f64,
}

impl Ranked for PredictedRating {
    fn id(&self) -> &str {
        &self.item_id
    }

    fn score(&self) -> f64 {
        self.predicted_rating
    }
}

/// User-user recommender over a shared rating matrix
#[derive(Debug, Clone)]
pub struct UserRecommender {
    matrix: Arc<RatingMatrix>,
    metric: SimilarityMetric,
    top_k: usize,
    min_co_raters: usize,
}

impl UserRecommender {
    pub fn new(matrix: Arc<RatingMatrix>) -> Self {
        let defaults = RecommenderConfig::default();
        Self {
            matrix,
            metric: defaults.similarity_metric,
            top_k: defaults.top_k,
            min_co_raters: defaults.min_co_raters,
        }
    }

    /// Create a recommender from a validated config
    ///
    /// `cache_similarities` only applies to item queries and is ignored here.
    pub fn from_config(matrix: Arc<RatingMatrix>, config: &RecommenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(matrix)
            .with_metric(config.similarity_metric)
            .with_top_k(config.top_k)
            .with_min_co_raters(config.min_co_raters))
    }

    pub fn with_metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Fewest co-rated items for two users to have a defined similarity
    ///
    /// Values below [`MIN_CO_RATERS`] are raised to it.
    pub fn with_min_co_raters(mut self, min: usize) -> Self {
        self.min_co_raters = min.max(MIN_CO_RATERS);
        self
    }

    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn min_co_raters(&self) -> usize {
        self.min_co_raters
    }

    fn row_of(&self, user_id: &str) -> Result<usize> {
        self.matrix
            .user_position(user_id)
            .ok_or_else(|| RecommendError::UnknownUser(user_id.to_string()))
    }

    /// Similarity between two users, `Ok(None)` when undefined
    pub fn similarity(&self, user_a: &str, user_b: &str) -> Result<Option<f64>> {
        let a = self.row_of(user_a)?;
        let b = self.row_of(user_b)?;
        Ok(user_similarity(
            &self.matrix,
            self.metric,
            self.min_co_raters,
            a,
            b,
        ))
    }

    /// Every other user with a defined similarity to `row`, in row order
    fn neighbours(&self, row: usize) -> Vec<(usize, f64)> {
        let (num_users, _) = self.matrix.dimensions();
        (0..num_users)
            .into_par_iter()
            .filter(|&other| other != row)
            .filter_map(|other| {
                user_similarity(&self.matrix, self.metric, self.min_co_raters, row, other)
                    .map(|score| (other, score))
            })
            .collect()
    }

    /// The `limit` users most similar to `user_id`
    ///
    /// # Errors
    /// - `UnknownUser` if `user_id` is not in the matrix
    /// - `NoCandidates` if no other user has a defined similarity
    /// - `InvalidConfig` if `limit` is zero
    #[instrument(skip(self), fields(metric = %self.metric))]
    pub fn top_matches(&self, user_id: &str, limit: usize) -> Result<Vec<UserMatch>> {
        check_limit(limit)?;
        let query = self.row_of(user_id)?;

        let neighbours = self.neighbours(query);
        debug!(neighbours = neighbours.len(), "Scored candidate users");
        if neighbours.is_empty() {
            return Err(RecommendError::NoCandidates(format!(
                "no user shares at least {} rated books with '{}' under {} similarity",
                self.min_co_raters, user_id, self.metric
            )));
        }

        let matches: Vec<UserMatch> = neighbours
            .into_iter()
            .map(|(row, score)| UserMatch {
                user_id: self.matrix.users()[row].clone(),
                score,
            })
            .collect();
        Ok(rank_and_truncate(matches, limit))
    }

    /// Predicted ratings for the books `user_id` has not rated, best first
    ///
    /// # Errors
    /// - `UnknownUser` if `user_id` is not in the matrix
    /// - `NoCandidates` if no unrated book has a positively similar rater
    /// - `InvalidConfig` if `limit` is zero
    #[instrument(skip(self), fields(metric = %self.metric))]
    pub fn recommend_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<PredictedRating>> {
        check_limit(limit)?;
        let query = self.row_of(user_id)?;
        let (_, num_items) = self.matrix.dimensions();

        let mut already_rated = vec![false; num_items];
        for &(column, _) in self.matrix.row(query) {
            already_rated[column] = true;
        }

        // (Σ sim · rating, Σ sim) per column. Neighbours are visited in row
        // order so the sums come out the same on every run.
        let mut totals = vec![(0.0f64, 0.0f64); num_items];
        let mut positive = 0usize;
        for (row, score) in self.neighbours(query) {
            if score <= 0.0 {
                continue;
            }
            positive += 1;
            for &(column, rating) in self.matrix.row(row) {
                if already_rated[column] {
                    continue;
                }
                let (weighted, weight) = &mut totals[column];
                *weighted += score * rating as f64;
                *weight += score;
            }
        }
        debug!(positive_neighbours = positive, "Accumulated neighbour ratings");

        let predictions: Vec<PredictedRating> = totals
            .into_iter()
            .enumerate()
            .filter(|&(_, (_, weight))| weight > 0.0)
            .map(|(column, (weighted, weight))| PredictedRating {
                item_id: self.matrix.items()[column].clone(),
                predicted_rating: weighted / weight,
            })
            .collect();

        if predictions.is_empty() {
            return Err(RecommendError::NoCandidates(format!(
                "no unrated book of '{}' was rated by a similar user",
                user_id
            )));
        }
        Ok(rank_and_truncate(predictions, limit))
    }
}

fn check_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(RecommendError::InvalidConfig(
            "result limit must be at least 1".to_string(),
        ));
    }
    Ok(())
}
