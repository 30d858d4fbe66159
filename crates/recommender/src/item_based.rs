//! Item-based collaborative filtering
//!
//! "Readers who rated this book rated these books the same way."
//!
//! ## Algorithm
//! 1. Look up the query item's column
//! 2. For every other item, collect the ratings of users who rated both
//! 3. Skip items with fewer than `min_co_raters` co-raters (undefined, not zero)
//! 4. Score the rest with the configured metric
//! 5. Sort by score descending, ties by item id ascending, keep the top K
//!
//! Step 2-4 run in parallel over candidate items with Rayon. Each worker only
//! reads the shared matrix, and step 5 sorts the collected scores before
//! truncating, so the list is the same however the workers are scheduled.
//!
//! Repeated queries can reuse a precomputed [`SimilarityTable`]
//! (see [`ItemRecommender::with_cache`]).

use crate::config::RecommenderConfig;
use crate::error::{RecommendError, Result};
use crate::ranking::{Ranked, rank_and_truncate};
use crate::similarity::{MIN_CO_RATERS, SimilarityMetric, item_similarity};
use data_loader::{ItemId, RatingMatrix};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// One entry of a recommendation list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    pub score: f64,
}

impl Ranked for Recommendation {
    fn id(&self) -> &str {
        &self.item_id
    }

    fn score(&self) -> f64 {
        self.score
    }
}

/// All defined item-item similarities, computed once.
///
/// For every column, the list of (other column, score) pairs with a defined
/// similarity, sorted by column. Each unordered pair is computed once and
/// stored in both lists, so lookups are symmetric by construction.
#[derive(Debug, Clone)]
pub struct SimilarityTable {
    metric: SimilarityMetric,
    min_co_raters: usize,
    neighbors: Vec<Vec<(usize, f64)>>,
}

impl SimilarityTable {
    /// Compute every pair (a, b) with a < b in parallel over `a`
    pub fn compute(matrix: &RatingMatrix, metric: SimilarityMetric, min_co_raters: usize) -> Self {
        let (_, num_items) = matrix.dimensions();

        let upper: Vec<Vec<(usize, f64)>> = (0..num_items)
            .into_par_iter()
            .map(|a| {
                ((a + 1)..num_items)
                    .filter_map(|b| {
                        item_similarity(matrix, metric, min_co_raters, a, b).map(|s| (b, s))
                    })
                    .collect()
            })
            .collect();

        let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); num_items];
        for (a, row) in upper.into_iter().enumerate() {
            for (b, score) in row {
                neighbors[a].push((b, score));
                neighbors[b].push((a, score));
            }
        }
        for list in &mut neighbors {
            list.sort_unstable_by_key(|&(column, _)| column);
        }

        let table = Self {
            metric,
            min_co_raters,
            neighbors,
        };
        info!(
            items = num_items,
            defined_pairs = table.defined_pairs(),
            %metric,
            "Computed item similarity table"
        );
        table
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    pub fn min_co_raters(&self) -> usize {
        self.min_co_raters
    }

    /// Number of unordered item pairs with a defined similarity
    pub fn defined_pairs(&self) -> usize {
        self.neighbors.iter().map(|n| n.len()).sum::<usize>() / 2
    }

    /// Defined similarities of one column, sorted by column
    pub fn neighbors(&self, column: usize) -> &[(usize, f64)] {
        self.neighbors
            .get(column)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Stored similarity between two different columns
    pub fn get(&self, column_a: usize, column_b: usize) -> Option<f64> {
        let list = self.neighbors(column_a);
        list.binary_search_by_key(&column_b, |&(column, _)| column)
            .ok()
            .map(|idx| list[idx].1)
    }
}

/// Item-item recommender over a shared rating matrix
#[derive(Debug, Clone)]
pub struct ItemRecommender {
    /// Shared reference to the matrix (read-only, so no Mutex needed)
    matrix: Arc<RatingMatrix>,
    metric: SimilarityMetric,
    top_k: usize,
    min_co_raters: usize,
    table: Option<Arc<SimilarityTable>>,
}

impl ItemRecommender {
    /// Create a recommender with default settings (cosine, top 10, 2 co-raters)
    pub fn new(matrix: Arc<RatingMatrix>) -> Self {
        let defaults = RecommenderConfig::default();
        Self {
            matrix,
            metric: defaults.similarity_metric,
            top_k: defaults.top_k,
            min_co_raters: defaults.min_co_raters,
            table: None,
        }
    }

    /// Create a recommender from a validated config
    pub fn from_config(matrix: Arc<RatingMatrix>, config: &RecommenderConfig) -> Result<Self> {
        config.validate()?;
        let recommender = Self::new(matrix)
            .with_metric(config.similarity_metric)
            .with_top_k(config.top_k)
            .with_min_co_raters(config.min_co_raters);
        Ok(if config.cache_similarities {
            recommender.with_cache()
        } else {
            recommender
        })
    }

    /// Configure the similarity metric (drops any cached table)
    pub fn with_metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = metric;
        self.table = None;
        self
    }

    /// Configure the list length used by [`recommend`](Self::recommend)
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Configure minimum co-raters for a defined similarity (drops any cached table)
    ///
    /// Values below [`MIN_CO_RATERS`] are raised to it.
    pub fn with_min_co_raters(mut self, min: usize) -> Self {
        self.min_co_raters = min.max(MIN_CO_RATERS);
        self.table = None;
        self
    }

    /// Precompute the all-pairs similarity table for repeated queries
    pub fn with_cache(mut self) -> Self {
        let table = SimilarityTable::compute(&self.matrix, self.metric, self.min_co_raters);
        self.table = Some(Arc::new(table));
        self
    }

    pub fn is_cached(&self) -> bool {
        self.table.is_some()
    }

    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn min_co_raters(&self) -> usize {
        self.min_co_raters
    }

    fn column_of(&self, item_id: &str) -> Result<usize> {
        self.matrix
            .item_position(item_id)
            .ok_or_else(|| RecommendError::UnknownItem(item_id.to_string()))
    }

    /// Similarity between two items, `Ok(None)` when undefined
    pub fn similarity(&self, item_a: &str, item_b: &str) -> Result<Option<f64>> {
        let a = self.column_of(item_a)?;
        let b = self.column_of(item_b)?;
        Ok(match &self.table {
            Some(table) if a != b => table.get(a, b),
            _ => item_similarity(&self.matrix, self.metric, self.min_co_raters, a, b),
        })
    }

    /// Top-K most similar items to `item_id`, K from the config
    pub fn recommend(&self, item_id: &str) -> Result<Vec<Recommendation>> {
        self.recommend_top(item_id, self.top_k)
    }

    /// Top-`k` most similar items to `item_id`
    ///
    /// # Errors
    /// - `UnknownItem` if `item_id` is not in the matrix
    /// - `NoCandidates` if no other item has a defined similarity
    /// - `InvalidConfig` if `k` is zero
    #[instrument(skip(self), fields(metric = %self.metric, cached = self.table.is_some()))]
    pub fn recommend_top(&self, item_id: &str, k: usize) -> Result<Vec<Recommendation>> {
        if k == 0 {
            return Err(RecommendError::InvalidConfig(
                "top_k must be at least 1".to_string(),
            ));
        }
        let query = self.column_of(item_id)?;

        let scored: Vec<(usize, f64)> = match &self.table {
            Some(table) => table.neighbors(query).to_vec(),
            None => {
                let (_, num_items) = self.matrix.dimensions();
                (0..num_items)
                    .into_par_iter()
                    .filter(|&column| column != query)
                    .filter_map(|column| {
                        item_similarity(&self.matrix, self.metric, self.min_co_raters, query, column)
                            .map(|score| (column, score))
                    })
                    .collect()
            }
        };
        debug!(candidates = scored.len(), "Scored candidate items");

        if scored.is_empty() {
            return Err(RecommendError::NoCandidates(format!(
                "no item shares at least {} co-raters with '{}' under {} similarity",
                self.min_co_raters, item_id, self.metric
            )));
        }

        let recommendations: Vec<Recommendation> = scored
            .into_iter()
            .map(|(column, score)| Recommendation {
                item_id: self.matrix.items()[column].clone(),
                score,
            })
            .collect();

        Ok(rank_and_truncate(recommendations, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::RatingRecord;

    fn example_matrix() -> Arc<RatingMatrix> {
        let records = vec![
            RatingRecord::new("u1", "bookA", 5.0),
            RatingRecord::new("u1", "bookB", 4.0),
            RatingRecord::new("u2", "bookA", 5.0),
            RatingRecord::new("u2", "bookB", 5.0),
            RatingRecord::new("u3", "bookA", 1.0),
        ];
        Arc::new(RatingMatrix::from_records(&records).unwrap())
    }

    /// Four users, five books; bookE is rated by a single user.
    fn library_matrix() -> Arc<RatingMatrix> {
        let ratings = [
            ("alice", "bookA", 5.0),
            ("alice", "bookB", 4.0),
            ("alice", "bookC", 1.0),
            ("alice", "bookD", 4.0),
            ("bob", "bookA", 4.0),
            ("bob", "bookB", 5.0),
            ("bob", "bookC", 2.0),
            ("bob", "bookD", 5.0),
            ("carol", "bookA", 1.0),
            ("carol", "bookB", 2.0),
            ("carol", "bookC", 5.0),
            ("carol", "bookE", 3.0),
            ("dave", "bookA", 2.0),
            ("dave", "bookC", 4.0),
            ("dave", "bookD", 2.0),
        ];
        let records: Vec<RatingRecord> = ratings
            .iter()
            .map(|&(u, i, r)| RatingRecord::new(u, i, r))
            .collect();
        Arc::new(RatingMatrix::from_records(&records).unwrap())
    }

    #[test]
    fn test_example_top_one() {
        let recommender = ItemRecommender::new(example_matrix()).with_top_k(1);
        let recs = recommender.recommend("bookA").unwrap();

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].item_id, "bookB");
        assert!(recs[0].score > 0.99);
        assert!(recs[0].score < 1.0);
    }

    #[test]
    fn test_unknown_item() {
        let recommender = ItemRecommender::new(example_matrix());
        let err = recommender.recommend("bookZ").unwrap_err();
        assert!(matches!(err, RecommendError::UnknownItem(id) if id == "bookZ"));

        assert!(matches!(
            recommender.similarity("bookA", "bookZ"),
            Err(RecommendError::UnknownItem(_))
        ));
    }

    #[test]
    fn test_no_candidates() {
        // bookE has one rater, so it has fewer than 2 co-raters with everything
        let recommender = ItemRecommender::new(library_matrix());
        let err = recommender.recommend("bookE").unwrap_err();
        assert!(matches!(err, RecommendError::NoCandidates(_)));
    }

    #[test]
    fn test_pearson_undefined_is_no_candidates() {
        // bookA's co-rated ratings with bookB are constant (5, 5)
        let recommender =
            ItemRecommender::new(example_matrix()).with_metric(SimilarityMetric::Pearson);
        assert!(matches!(
            recommender.recommend("bookA"),
            Err(RecommendError::NoCandidates(_))
        ));
    }

    #[test]
    fn test_list_properties() {
        let recommender = ItemRecommender::new(library_matrix()).with_top_k(3);

        for item in ["bookA", "bookB", "bookC", "bookD"] {
            let recs = recommender.recommend(item).unwrap();
            assert!(recs.len() <= 3);
            assert!(recs.iter().all(|r| r.item_id != item));
            // bookE is never a candidate
            assert!(recs.iter().all(|r| r.item_id != "bookE"));
            for pair in recs.windows(2) {
                assert!(
                    pair[0].score > pair[1].score
                        || (pair[0].score == pair[1].score && pair[0].item_id < pair[1].item_id)
                );
            }
        }
    }

    #[test]
    fn test_similar_items_rank_first() {
        let recommender = ItemRecommender::new(library_matrix())
            .with_metric(SimilarityMetric::Pearson)
            .with_top_k(4);
        let recs = recommender.recommend("bookA").unwrap();

        // bookC is rated the opposite way to bookA
        assert_eq!(recs.last().map(|r| r.item_id.as_str()), Some("bookC"));
        assert!(recs.last().unwrap().score < 0.0);
    }

    #[test]
    fn test_similarity_symmetric_and_self_is_max() {
        let recommender = ItemRecommender::new(library_matrix());
        let items = recommender.matrix().items().to_vec();

        for a in &items {
            assert_eq!(recommender.similarity(a, a).unwrap(), Some(1.0));
            for b in &items {
                assert_eq!(
                    recommender.similarity(a, b).unwrap(),
                    recommender.similarity(b, a).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_cached_matches_uncached() {
        for metric in [
            SimilarityMetric::Cosine,
            SimilarityMetric::Pearson,
            SimilarityMetric::Euclidean,
        ] {
            let plain = ItemRecommender::new(library_matrix())
                .with_metric(metric)
                .with_top_k(10);
            let cached = plain.clone().with_cache();
            assert!(cached.is_cached());

            for item in plain.matrix().items() {
                let expected = plain.recommend(item);
                let actual = cached.recommend(item);
                match (expected, actual) {
                    (Ok(e), Ok(a)) => assert_eq!(e, a),
                    (Err(_), Err(_)) => {}
                    (e, a) => panic!("cached and uncached disagree for {item}: {e:?} vs {a:?}"),
                }
                for other in plain.matrix().items() {
                    assert_eq!(
                        plain.similarity(item, other).unwrap(),
                        cached.similarity(item, other).unwrap()
                    );
                }
            }
        }
    }

    #[test]
    fn test_reconfiguring_drops_cache() {
        let recommender = ItemRecommender::new(library_matrix()).with_cache();
        assert!(recommender.is_cached());
        assert!(!recommender.with_metric(SimilarityMetric::Euclidean).is_cached());
    }

    #[test]
    fn test_from_config() {
        let config = RecommenderConfig {
            similarity_metric: SimilarityMetric::Euclidean,
            top_k: 2,
            min_co_raters: 3,
            cache_similarities: true,
        };
        let recommender = ItemRecommender::from_config(library_matrix(), &config).unwrap();

        assert_eq!(recommender.metric(), SimilarityMetric::Euclidean);
        assert_eq!(recommender.top_k(), 2);
        assert!(recommender.is_cached());
        assert!(recommender.recommend("bookA").unwrap().len() <= 2);

        let bad = RecommenderConfig {
            top_k: 0,
            ..Default::default()
        };
        assert!(ItemRecommender::from_config(library_matrix(), &bad).is_err());
    }

    #[test]
    fn test_single_co_rater_never_recommends() {
        // u1 is the only reader of both books, and rated them oppositely
        let records = vec![
            RatingRecord::new("u1", "bookA", 5.0),
            RatingRecord::new("u1", "bookB", 1.0),
            RatingRecord::new("u2", "bookA", 3.0),
            RatingRecord::new("u3", "bookB", 4.0),
        ];
        let matrix = Arc::new(RatingMatrix::from_records(&records).unwrap());

        let recommender = ItemRecommender::new(matrix.clone()).with_min_co_raters(1);
        assert_eq!(recommender.min_co_raters(), 2);
        assert!(matches!(
            recommender.recommend("bookA"),
            Err(RecommendError::NoCandidates(_))
        ));
        assert!(matches!(
            recommender.with_cache().recommend("bookA"),
            Err(RecommendError::NoCandidates(_))
        ));

        let config = RecommenderConfig {
            min_co_raters: 1,
            ..Default::default()
        };
        assert!(matches!(
            ItemRecommender::from_config(matrix, &config),
            Err(RecommendError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_k_rejected() {
        let recommender = ItemRecommender::new(example_matrix());
        assert!(matches!(
            recommender.recommend_top("bookA", 0),
            Err(RecommendError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_table_defined_pairs() {
        let table = SimilarityTable::compute(&library_matrix(), SimilarityMetric::Cosine, 2);
        // A, B, C, D all share >= 2 raters pairwise; E shares at most 1
        assert_eq!(table.defined_pairs(), 6);
        assert!(table.neighbors(4).is_empty());
        assert_eq!(table.get(0, 1), table.get(1, 0));
        assert_eq!(table.get(0, 4), None);
    }
}
