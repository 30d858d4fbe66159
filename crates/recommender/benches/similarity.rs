//! Benchmarks for similarity queries
//!
//! Run with: cargo bench --package recommender
//!
//! Uses a synthetic 2,000 reader x 400 book matrix so the numbers do not
//! depend on a local dataset.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{RatingMatrix, RatingRecord};
use recommender::{ItemRecommender, SimilarityMetric, SimilarityTable, UserRecommender};
use std::sync::Arc;

const READERS: usize = 2_000;
const BOOKS: usize = 400;

/// Deterministic sparse ratings: each reader rates roughly one book in ten
fn synthetic_matrix() -> Arc<RatingMatrix> {
    let mut records = Vec::new();
    for reader in 0..READERS {
        for book in 0..BOOKS {
            let hash = (reader * 7_919 + book * 104_729) % 97;
            if hash < 10 {
                let rating = 1.0 + ((reader + book * 3) % 5) as f32;
                records.push(RatingRecord::new(
                    format!("reader{reader}"),
                    format!("book{book}"),
                    rating,
                ));
            }
        }
    }
    Arc::new(RatingMatrix::from_records(&records).expect("Failed to build matrix"))
}

fn bench_item_recommend(c: &mut Criterion) {
    let matrix = synthetic_matrix();

    for metric in [SimilarityMetric::Cosine, SimilarityMetric::Pearson] {
        let recommender = ItemRecommender::new(matrix.clone()).with_metric(metric);
        c.bench_function(&format!("item_recommend_{metric}"), |b| {
            b.iter(|| {
                let recs = recommender.recommend(black_box("book42"));
                black_box(recs)
            })
        });
    }
}

fn bench_cached_item_recommend(c: &mut Criterion) {
    let recommender = ItemRecommender::new(synthetic_matrix()).with_cache();

    c.bench_function("item_recommend_cached", |b| {
        b.iter(|| {
            let recs = recommender.recommend(black_box("book42"));
            black_box(recs)
        })
    });
}

fn bench_similarity_table(c: &mut Criterion) {
    let matrix = synthetic_matrix();

    let mut group = c.benchmark_group("similarity_table");
    group.sample_size(10);
    group.bench_function("compute_cosine", |b| {
        b.iter(|| {
            let table = SimilarityTable::compute(&matrix, SimilarityMetric::Cosine, 2);
            black_box(table)
        })
    });
    group.finish();
}

fn bench_user_recommend(c: &mut Criterion) {
    let recommender = UserRecommender::new(synthetic_matrix());

    c.bench_function("recommend_for_user", |b| {
        b.iter(|| {
            let recs = recommender.recommend_for_user(black_box("reader7"), black_box(10));
            black_box(recs)
        })
    });
}

criterion_group!(
    benches,
    bench_item_recommend,
    bench_cached_item_recommend,
    bench_similarity_table,
    bench_user_recommend
);
criterion_main!(benches);
