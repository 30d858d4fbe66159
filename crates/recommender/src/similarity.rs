//! Similarity metrics over co-rated pairs.
//!
//! Every metric works on a list of rating pairs: the two ratings each
//! co-rater gave (for items) or the two ratings given to each co-rated item
//! (for users). Absent cells never enter a pair, so "no evidence" and
//! "low rating" are kept apart.
//!
//! ## Metrics
//! - **Cosine**: `Σxy / (√Σx² · √Σy²)`
//! - **Pearson**: correlation of the pairs around their own means
//! - **Euclidean**: `1 / (1 + Σ(x - y)²)`, the distance score
//!
//! All three top out at 1.0. A metric returns `None` when it is undefined
//! for the pairs (zero norm, zero variance, no pairs).

use data_loader::RatingMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RecommendError;

/// Highest score any metric can produce; also the score of an item with itself
pub const MAX_SIMILARITY: f64 = 1.0;

/// Fewest co-raters a similarity can ever be defined on.
///
/// One shared rating scores 1.0 under cosine whatever the two values are,
/// so a single co-rater is treated as no evidence. Lower settings are raised
/// to this floor.
pub const MIN_CO_RATERS: usize = 2;

/// Which similarity function to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    #[default]
    Cosine,
    Pearson,
    Euclidean,
}

impl SimilarityMetric {
    /// Score a list of (x, y) rating pairs
    ///
    /// Returns `None` when the metric is undefined for these pairs. Results
    /// are clamped to the metric's range to absorb rounding.
    pub fn score(self, pairs: &[(f32, f32)]) -> Option<f64> {
        if pairs.is_empty() {
            return None;
        }
        let score = match self {
            SimilarityMetric::Cosine => cosine(pairs)?,
            SimilarityMetric::Pearson => pearson(pairs)?,
            SimilarityMetric::Euclidean => euclidean(pairs),
        };
        if score.is_finite() {
            Some(score.clamp(-MAX_SIMILARITY, MAX_SIMILARITY))
        } else {
            None
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimilarityMetric::Cosine => "cosine",
            SimilarityMetric::Pearson => "pearson",
            SimilarityMetric::Euclidean => "euclidean",
        };
        f.write_str(name)
    }
}

impl FromStr for SimilarityMetric {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(SimilarityMetric::Cosine),
            "pearson" => Ok(SimilarityMetric::Pearson),
            "euclidean" => Ok(SimilarityMetric::Euclidean),
            other => Err(RecommendError::InvalidConfig(format!(
                "unknown similarity metric '{other}' (expected cosine, pearson or euclidean)"
            ))),
        }
    }
}

fn cosine(pairs: &[(f32, f32)]) -> Option<f64> {
    let (mut dot, mut norm_x, mut norm_y) = (0.0f64, 0.0f64, 0.0f64);
    for &(x, y) in pairs {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_x += x * x;
        norm_y += y * y;
    }
    if norm_x == 0.0 || norm_y == 0.0 {
        return None;
    }
    Some(dot / (norm_x.sqrt() * norm_y.sqrt()))
}

fn pearson(pairs: &[(f32, f32)]) -> Option<f64> {
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|&(x, _)| x as f64).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|&(_, y)| y as f64).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0f64, 0.0f64, 0.0f64);
    for &(x, y) in pairs {
        let dx = x as f64 - mean_x;
        let dy = y as f64 - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

fn euclidean(pairs: &[(f32, f32)]) -> f64 {
    let sum_of_squares: f64 = pairs
        .iter()
        .map(|&(x, y)| (x as f64 - y as f64).powi(2))
        .sum();
    1.0 / (1.0 + sum_of_squares)
}

/// Similarity between two item columns over their co-raters.
///
/// `None` when fewer than `min_co_raters` users (and never fewer than
/// [`MIN_CO_RATERS`]) rated both items, or the metric is undefined. An item
/// compared with itself scores [`MAX_SIMILARITY`].
pub fn item_similarity(
    matrix: &RatingMatrix,
    metric: SimilarityMetric,
    min_co_raters: usize,
    column_a: usize,
    column_b: usize,
) -> Option<f64> {
    if column_a == column_b {
        return Some(MAX_SIMILARITY);
    }
    let pairs = matrix.co_raters(column_a, column_b);
    if pairs.len() < min_co_raters.max(MIN_CO_RATERS) {
        return None;
    }
    metric.score(&pairs)
}

/// Similarity between two user rows over their co-rated items.
///
/// Same rules as [`item_similarity`], with items and users swapped.
pub fn user_similarity(
    matrix: &RatingMatrix,
    metric: SimilarityMetric,
    min_co_rated: usize,
    row_a: usize,
    row_b: usize,
) -> Option<f64> {
    if row_a == row_b {
        return Some(MAX_SIMILARITY);
    }
    let pairs = matrix.co_rated_items(row_a, row_b);
    if pairs.len() < min_co_rated.max(MIN_CO_RATERS) {
        return None;
    }
    metric.score(&pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::RatingRecord;

    #[test]
    fn test_cosine_near_identical() {
        // bookA vs bookB over co-raters u1, u2
        let score = SimilarityMetric::Cosine
            .score(&[(5.0, 4.0), (5.0, 5.0)])
            .unwrap();
        assert!(score > 0.99);
        assert!((score - 45.0 / (50.0f64.sqrt() * 41.0f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_identical_is_max() {
        let score = SimilarityMetric::Cosine
            .score(&[(3.0, 3.0), (4.0, 4.0), (1.0, 1.0)])
            .unwrap();
        assert!(score <= MAX_SIMILARITY);
        assert!((score - MAX_SIMILARITY).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_norm_undefined() {
        assert_eq!(SimilarityMetric::Cosine.score(&[(0.0, 3.0), (0.0, 4.0)]), None);
    }

    #[test]
    fn test_pearson() {
        // perfectly correlated
        let pos = SimilarityMetric::Pearson
            .score(&[(1.0, 2.0), (2.0, 3.0), (3.0, 4.0)])
            .unwrap();
        assert!((pos - 1.0).abs() < 1e-12);

        // perfectly anti-correlated
        let neg = SimilarityMetric::Pearson
            .score(&[(1.0, 5.0), (3.0, 3.0), (5.0, 1.0)])
            .unwrap();
        assert!((neg + 1.0).abs() < 1e-12);

        // constant ratings have no variance
        assert_eq!(
            SimilarityMetric::Pearson.score(&[(5.0, 4.0), (5.0, 5.0)]),
            None
        );
    }

    #[test]
    fn test_euclidean_distance_score() {
        // (5-4)^2 + (5-5)^2 = 1 -> 1 / 2
        let score = SimilarityMetric::Euclidean
            .score(&[(5.0, 4.0), (5.0, 5.0)])
            .unwrap();
        assert!((score - 0.5).abs() < 1e-12);

        let same = SimilarityMetric::Euclidean.score(&[(2.0, 2.0)]).unwrap();
        assert_eq!(same, MAX_SIMILARITY);
    }

    #[test]
    fn test_empty_pairs_undefined() {
        for metric in [
            SimilarityMetric::Cosine,
            SimilarityMetric::Pearson,
            SimilarityMetric::Euclidean,
        ] {
            assert_eq!(metric.score(&[]), None);
        }
    }

    #[test]
    fn test_metric_parse_and_display() {
        assert_eq!("cosine".parse::<SimilarityMetric>().unwrap(), SimilarityMetric::Cosine);
        assert_eq!("Pearson".parse::<SimilarityMetric>().unwrap(), SimilarityMetric::Pearson);
        assert_eq!(SimilarityMetric::Euclidean.to_string(), "euclidean");
        assert!(matches!(
            "jaccard".parse::<SimilarityMetric>(),
            Err(RecommendError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_item_similarity_rules() {
        let matrix = RatingMatrix::from_records(&[
            RatingRecord::new("u1", "a", 5.0),
            RatingRecord::new("u1", "b", 4.0),
            RatingRecord::new("u2", "a", 5.0),
            RatingRecord::new("u2", "b", 5.0),
            RatingRecord::new("u2", "c", 2.0),
        ])
        .unwrap();
        let (a, b, c) = (0, 1, 2);

        assert_eq!(
            item_similarity(&matrix, SimilarityMetric::Cosine, 2, a, a),
            Some(MAX_SIMILARITY)
        );
        assert!(item_similarity(&matrix, SimilarityMetric::Cosine, 2, a, b).is_some());
        // only u2 rated both a and c
        assert_eq!(item_similarity(&matrix, SimilarityMetric::Cosine, 2, a, c), None);
        // a threshold below the floor does not admit a single co-rater
        assert_eq!(item_similarity(&matrix, SimilarityMetric::Cosine, 1, a, c), None);
        assert_eq!(item_similarity(&matrix, SimilarityMetric::Cosine, 0, a, c), None);
    }

    #[test]
    fn test_single_opposite_rating_is_not_similar() {
        // u1 loved a and hated b; nobody else rated both
        let matrix = RatingMatrix::from_records(&[
            RatingRecord::new("u1", "a", 5.0),
            RatingRecord::new("u1", "b", 1.0),
            RatingRecord::new("u2", "a", 3.0),
            RatingRecord::new("u3", "b", 4.0),
        ])
        .unwrap();

        for metric in [
            SimilarityMetric::Cosine,
            SimilarityMetric::Pearson,
            SimilarityMetric::Euclidean,
        ] {
            assert_eq!(item_similarity(&matrix, metric, 1, 0, 1), None);
        }
        // the raw score of that one pair would have been perfect
        assert_eq!(SimilarityMetric::Cosine.score(&[(5.0, 1.0)]), Some(1.0));
    }

    #[test]
    fn test_symmetry() {
        let matrix = RatingMatrix::from_records(&[
            RatingRecord::new("u1", "a", 5.0),
            RatingRecord::new("u1", "b", 2.0),
            RatingRecord::new("u2", "a", 3.0),
            RatingRecord::new("u2", "b", 4.0),
            RatingRecord::new("u3", "a", 1.0),
            RatingRecord::new("u3", "b", 5.0),
        ])
        .unwrap();

        for metric in [
            SimilarityMetric::Cosine,
            SimilarityMetric::Pearson,
            SimilarityMetric::Euclidean,
        ] {
            assert_eq!(
                item_similarity(&matrix, metric, 2, 0, 1),
                item_similarity(&matrix, metric, 2, 1, 0)
            );
            assert_eq!(
                user_similarity(&matrix, metric, 2, 0, 2),
                user_similarity(&matrix, metric, 2, 2, 0)
            );
        }
    }
}
