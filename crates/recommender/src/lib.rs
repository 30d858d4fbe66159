//! # Recommender Crate
//!
//! Collaborative-filtering queries over a [`RatingMatrix`](data_loader::RatingMatrix).
//!
//! ## Components
//!
//! ### Item-based
//! "Readers who rated this book rated these books the same way":
//! - `ItemRecommender::recommend` ranks every other book by similarity
//! - Similarity is computed over co-raters only
//! - Optional `SimilarityTable` cache for repeated queries
//!
//! ### User-based
//! "Readers like you also liked...":
//! - `UserRecommender::top_matches` ranks the most similar readers
//! - `UserRecommender::recommend_for_user` predicts ratings for unread books
//!
//! ## Example Usage
//!
//! ```ignore
//! use recommender::{ItemRecommender, SimilarityMetric};
//! use std::sync::Arc;
//!
//! let matrix = Arc::new(RatingMatrix::from_records(&conditioned)?);
//!
//! let recommender = ItemRecommender::new(matrix.clone())
//!     .with_metric(SimilarityMetric::Pearson)
//!     .with_top_k(5);
//!
//! for rec in recommender.recommend("The Great Gatsby")? {
//!     println!("{} ({:.3})", rec.item_id, rec.score);
//! }
//! ```
//!
//! ## Learning Goals
//!
//! 1. **Enums with behaviour**: `SimilarityMetric::score` dispatches on the variant
//! 2. **Option vs zero**: an undefined similarity is `None`, never `0.0`
//! 3. **Arc for Sharing**: both recommenders share one read-only matrix
//! 4. **Rayon**: scoring candidates in parallel, then sorting for determinism
//! 5. **Traits**: `Ranked` gives every result list the same ordering

pub mod error;
pub mod config;
pub mod similarity;
pub mod ranking;
pub mod item_based;
pub mod user_based;

// Re-export main types
pub use error::{RecommendError, Result};
pub use config::RecommenderConfig;
pub use similarity::{SimilarityMetric, MAX_SIMILARITY};
pub use ranking::Ranked;
pub use item_based::{ItemRecommender, Recommendation, SimilarityTable};
pub use user_based::{PredictedRating, UserMatch, UserRecommender};
