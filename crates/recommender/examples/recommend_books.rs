//! Example: Recommend books from a review export
//!
//! Run with: cargo run --package recommender --example recommend_books
//!
//! This example shows how to:
//! 1. Load the GoodReads review CSV
//! 2. Condition the ratings
//! 3. Build the rating matrix
//! 4. Find books similar to a title
//! 5. Predict ratings for a reader

use data_loader::{parser, CsvColumns, RatingMatrix};
use pipeline::{Conditioner, ConditioningConfig};
use recommender::{ItemRecommender, SimilarityMetric, UserRecommender};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    println!("=== Book Recommendation Example ===\n");

    // Load and condition
    let start = Instant::now();
    let report = parser::parse_ratings_csv(Path::new("data/br.csv"), &CsvColumns::default())?;
    let config = ConditioningConfig::default()
        .with_min_ratings_per_item(2)
        .with_ascii_only(true);
    let records = Conditioner::new(config)?.condition(report.records)?;
    let matrix = Arc::new(RatingMatrix::from_records(&records)?);
    let (users, items) = matrix.dimensions();
    println!(
        "Built {} x {} matrix ({:.2}% dense) in {:?}\n",
        users,
        items,
        matrix.density() * 100.0,
        start.elapsed()
    );

    // Pick the most-rated book as the query
    let Some(query) = matrix
        .item_stats()
        .into_iter()
        .max_by_key(|s| s.rating_count)
        .map(|s| s.item_id)
    else {
        anyhow::bail!("matrix has no items");
    };

    println!("Books similar to \"{}\":", query);
    let items_rec = ItemRecommender::new(matrix.clone())
        .with_metric(SimilarityMetric::Euclidean)
        .with_top_k(5);
    let start = Instant::now();
    match items_rec.recommend(&query) {
        Ok(recs) => {
            for (i, rec) in recs.iter().enumerate() {
                println!("  {}. {} (Score: {:.3})", i + 1, rec.item_id, rec.score);
            }
        }
        Err(e) => println!("  {}", e),
    }
    println!("Query took {:?}\n", start.elapsed());

    // Predict ratings for the first reader
    let Some(reader) = matrix.user_id(0).map(str::to_string) else {
        anyhow::bail!("matrix has no users");
    };
    println!("Predicted ratings for {}:", reader);
    let users_rec = UserRecommender::new(matrix.clone());
    match users_rec.recommend_for_user(&reader, 5) {
        Ok(predictions) => {
            for (i, p) in predictions.iter().enumerate() {
                println!("  {}. {} ({:.2})", i + 1, p.item_id, p.predicted_rating);
            }
        }
        Err(e) => println!("  {}", e),
    }

    Ok(())
}
