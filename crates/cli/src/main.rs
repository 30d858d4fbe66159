use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::{parser, CsvColumns, ItemStats, RatingMatrix};
use pipeline::{Conditioner, ConditioningConfig, DuplicatePolicy, StageReport};
use recommender::{
    ItemRecommender, PredictedRating, Recommendation, RecommenderConfig, SimilarityMetric,
    UserMatch, UserRecommender,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// BookRecs - Book Recommendation Engine
#[derive(Parser)]
#[command(name = "book-recs")]
#[command(about = "Book recommendations from reader ratings using collaborative filtering", long_about = None)]
struct Cli {
    /// Path to the ratings CSV (review export with a header line)
    #[arg(short, long, default_value = "data/br.csv")]
    data: PathBuf,

    /// JSON config file: {"columns": {..}, "conditioning": {..}, "recommender": {..}}
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that take precedence over the config file
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Similarity metric: cosine, pearson or euclidean
    #[arg(long)]
    metric: Option<SimilarityMetric>,

    /// Default length of result lists
    #[arg(long)]
    top_k: Option<usize>,

    /// Fewest co-raters for a similarity to count (at least 2)
    #[arg(long)]
    min_co_raters: Option<usize>,

    /// Precompute all item-item similarities before querying
    #[arg(long)]
    cache: bool,

    /// Drop books with fewer distinct raters
    #[arg(long)]
    min_item_ratings: Option<usize>,

    /// Drop readers with fewer rated books
    #[arg(long)]
    min_user_ratings: Option<usize>,

    /// Lowest valid rating
    #[arg(long)]
    rating_min: Option<f32>,

    /// Highest valid rating
    #[arg(long)]
    rating_max: Option<f32>,

    /// Drop records with non-ASCII reader names or titles
    #[arg(long)]
    ascii_only: bool,

    /// Repeated (reader, book) ratings: reject, keep-first or keep-last
    #[arg(long)]
    duplicates: Option<DuplicatePolicy>,
}

#[derive(Subcommand)]
enum Commands {
    /// Books most similar to a title
    Similar {
        /// Title to find similar books for
        #[arg(long)]
        item: String,

        /// Number of books to return (defaults to top_k)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Readers whose ratings look most like a reader's
    Matches {
        /// Reader name
        #[arg(long)]
        user: String,

        /// Number of readers to return (defaults to top_k)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Predicted ratings for books a reader has not rated yet
    Recommend {
        /// Reader name
        #[arg(long)]
        user: String,

        /// Number of books to return (defaults to top_k)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show dataset, conditioning and matrix statistics
    Stats {
        /// Number of most popular books to list
        #[arg(long, default_value = "10")]
        top: usize,
    },
}

/// Everything a run can be configured with
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Settings {
    columns: CsvColumns,
    conditioning: ConditioningConfig,
    recommender: RecommenderConfig,
}

impl Settings {
    /// Read a JSON config file, or use defaults when there is none
    fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn apply(&mut self, overrides: &Overrides) {
        let conditioning = &mut self.conditioning;
        if let Some(min) = overrides.min_item_ratings {
            conditioning.min_ratings_per_item = min;
        }
        if let Some(min) = overrides.min_user_ratings {
            conditioning.min_ratings_per_user = min;
        }
        if let Some(min) = overrides.rating_min {
            conditioning.rating_min = min;
        }
        if let Some(max) = overrides.rating_max {
            conditioning.rating_max = max;
        }
        if overrides.ascii_only {
            conditioning.ascii_only = true;
        }
        if let Some(policy) = overrides.duplicates {
            conditioning.duplicate_policy = policy;
        }

        let recommender = &mut self.recommender;
        if let Some(metric) = overrides.metric {
            recommender.similarity_metric = metric;
        }
        if let Some(top_k) = overrides.top_k {
            recommender.top_k = top_k;
        }
        if let Some(min) = overrides.min_co_raters {
            recommender.min_co_raters = min;
        }
        if overrides.cache {
            recommender.cache_similarities = true;
        }
    }
}

/// A loaded, conditioned dataset and its matrix
struct Dataset {
    total_lines: usize,
    skipped_lines: usize,
    raw_records: usize,
    stages: Vec<StageReport>,
    matrix: Arc<RatingMatrix>,
}

fn main() -> Result<()> {
    // Initialize tracing on stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply(&cli.overrides);

    let dataset = load_dataset(&cli.data, &settings, cli.json)?;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Similar { item, limit } => {
            handle_similar(&dataset, &settings, &item, limit, cli.json)?
        }
        Commands::Matches { user, limit } => {
            handle_matches(&dataset, &settings, &user, limit, cli.json)?
        }
        Commands::Recommend { user, limit } => {
            handle_recommend(&dataset, &settings, &user, limit, cli.json)?
        }
        Commands::Stats { top } => handle_stats(&dataset, top, cli.json)?,
    }

    Ok(())
}

/// Load the CSV, condition it and build the rating matrix
fn load_dataset(path: &Path, settings: &Settings, quiet: bool) -> Result<Dataset> {
    if !quiet {
        println!("Loading ratings from {}...", path.display());
    }
    let start = Instant::now();

    let report = parser::parse_ratings_csv(path, &settings.columns)
        .with_context(|| format!("Failed to load ratings from {}", path.display()))?;
    let (total_lines, skipped_lines, raw_records) =
        (report.total_lines, report.skipped_lines, report.records.len());

    let conditioner =
        Conditioner::new(settings.conditioning.clone()).context("Invalid conditioning settings")?;
    let conditioned = conditioner
        .condition_with_report(report.records)
        .context("Failed to condition ratings")?;

    let matrix = RatingMatrix::from_records(&conditioned.records)
        .context("Failed to build the rating matrix")?;
    let (users, items) = matrix.dimensions();
    info!(users, items, elapsed = ?start.elapsed(), "Dataset ready");

    if !quiet {
        println!(
            "{} Loaded {} readers x {} books in {:?}",
            "✓".green(),
            users,
            items,
            start.elapsed()
        );
    }

    Ok(Dataset {
        total_lines,
        skipped_lines,
        raw_records,
        stages: conditioned.stages,
        matrix: Arc::new(matrix),
    })
}

/// Handle the 'similar' command
fn handle_similar(
    dataset: &Dataset,
    settings: &Settings,
    item: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let recommender = ItemRecommender::from_config(dataset.matrix.clone(), &settings.recommender)
        .context("Invalid recommender settings")?;
    let limit = limit.unwrap_or(recommender.top_k());

    let start = Instant::now();
    let recommendations = recommender
        .recommend_top(item, limit)
        .with_context(|| format!("Cannot recommend books similar to '{}'", item))?;
    info!(elapsed = ?start.elapsed(), "Similarity query finished");

    if json {
        return print_json(&recommendations);
    }
    print_recommendations(item, recommender.metric(), &recommendations);
    Ok(())
}

/// Handle the 'matches' command
fn handle_matches(
    dataset: &Dataset,
    settings: &Settings,
    user: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let recommender = UserRecommender::from_config(dataset.matrix.clone(), &settings.recommender)
        .context("Invalid recommender settings")?;
    let limit = limit.unwrap_or(recommender.top_k());

    let matches = recommender
        .top_matches(user, limit)
        .with_context(|| format!("Cannot find readers similar to '{}'", user))?;

    if json {
        return print_json(&matches);
    }
    print_matches(user, &matches);
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    dataset: &Dataset,
    settings: &Settings,
    user: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let recommender = UserRecommender::from_config(dataset.matrix.clone(), &settings.recommender)
        .context("Invalid recommender settings")?;
    let limit = limit.unwrap_or(recommender.top_k());

    let predictions = recommender
        .recommend_for_user(user, limit)
        .with_context(|| format!("Cannot recommend books for '{}'", user))?;

    if json {
        return print_json(&predictions);
    }
    print_predictions(user, &predictions);
    Ok(())
}

#[derive(Serialize)]
struct StatsSummary<'a> {
    total_lines: usize,
    skipped_lines: usize,
    raw_records: usize,
    stages: &'a [StageReport],
    users: usize,
    items: usize,
    rated_cells: usize,
    density: f64,
    top_items: Vec<ItemStats>,
}

/// Handle the 'stats' command
fn handle_stats(dataset: &Dataset, top: usize, json: bool) -> Result<()> {
    let matrix = &dataset.matrix;
    let (users, items) = matrix.dimensions();

    let mut top_items = matrix.item_stats();
    top_items.sort_by(|a, b| {
        b.popularity_score
            .total_cmp(&a.popularity_score)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    top_items.truncate(top);

    let summary = StatsSummary {
        total_lines: dataset.total_lines,
        skipped_lines: dataset.skipped_lines,
        raw_records: dataset.raw_records,
        stages: &dataset.stages,
        users,
        items,
        rated_cells: matrix.rated_count(),
        density: matrix.density(),
        top_items,
    };

    if json {
        return print_json(&summary);
    }

    println!("{}", "Dataset:".bold().blue());
    println!("{}Lines read: {}", "• ".green(), summary.total_lines);
    println!("{}Malformed lines skipped: {}", "• ".green(), summary.skipped_lines);
    println!("{}Records: {}", "• ".green(), summary.raw_records);

    println!("{}", "Conditioning:".bold().blue());
    for stage in summary.stages {
        println!(
            "{}{}: {} -> {} (removed {})",
            "• ".cyan(),
            stage.name,
            stage.input,
            stage.output,
            stage.removed()
        );
    }

    println!("{}", "Rating matrix:".bold().blue());
    println!("{}Readers: {}", "• ".green(), summary.users);
    println!("{}Books: {}", "• ".green(), summary.items);
    println!(
        "{}Rated cells: {} ({:.3}% dense)",
        "• ".green(),
        summary.rated_cells,
        summary.density * 100.0
    );

    println!("{}", "Most popular books:".bold().blue());
    for (rank, stats) in summary.top_items.iter().enumerate() {
        println!(
            "{}. {} - avg {:.2} ({} ratings)",
            (rank + 1).to_string().green(),
            stats.item_id,
            stats.avg_rating,
            stats.rating_count
        );
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

/// Helper function to format and print item recommendations
fn print_recommendations(item: &str, metric: SimilarityMetric, recommendations: &[Recommendation]) {
    println!(
        "{}",
        format!("Books similar to '{}' ({} similarity):", item, metric)
            .bold()
            .blue()
    );
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} - Score: {:.4}",
            (rank + 1).to_string().green(),
            rec.item_id,
            rec.score
        );
    }
}

fn print_matches(user: &str, matches: &[UserMatch]) {
    println!("{}", format!("Readers similar to '{}':", user).bold().blue());
    for (rank, m) in matches.iter().enumerate() {
        println!(
            "{}. {} - Score: {:.4}",
            (rank + 1).to_string().green(),
            m.user_id,
            m.score
        );
    }
}

fn print_predictions(user: &str, predictions: &[PredictedRating]) {
    println!("{}", format!("Recommended books for '{}':", user).bold().blue());
    for (rank, p) in predictions.iter().enumerate() {
        println!(
            "{}. {} - Predicted rating: {:.2}",
            (rank + 1).to_string().green(),
            p.item_id,
            p.predicted_rating
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags_and_subcommand() {
        let cli = Cli::try_parse_from([
            "book-recs",
            "--data",
            "reviews.csv",
            "--metric",
            "pearson",
            "--duplicates",
            "keep-last",
            "similar",
            "--item",
            "Emma",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.data, PathBuf::from("reviews.csv"));
        assert!(cli.json);
        assert_eq!(cli.overrides.metric, Some(SimilarityMetric::Pearson));
        assert_eq!(cli.overrides.duplicates, Some(DuplicatePolicy::KeepLast));
        assert!(matches!(cli.command, Commands::Similar { ref item, limit: None } if item == "Emma"));
    }

    #[test]
    fn test_unknown_metric_rejected() {
        let result = Cli::try_parse_from(["book-recs", "--metric", "jaccard", "stats"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut settings: Settings = serde_json::from_str(
            r#"{
                "conditioning": {"min_ratings_per_item": 3, "ascii_only": true},
                "recommender": {"similarity_metric": "euclidean", "top_k": 5}
            }"#,
        )
        .unwrap();

        settings.apply(&Overrides {
            top_k: Some(2),
            min_user_ratings: Some(4),
            ..Default::default()
        });

        assert_eq!(settings.conditioning.min_ratings_per_item, 3);
        assert_eq!(settings.conditioning.min_ratings_per_user, 4);
        assert!(settings.conditioning.ascii_only);
        assert_eq!(settings.recommender.similarity_metric, SimilarityMetric::Euclidean);
        assert_eq!(settings.recommender.top_k, 2);
        assert_eq!(settings.columns, CsvColumns::default());
    }

    #[test]
    fn test_unknown_config_section_rejected() {
        let result: std::result::Result<Settings, _> =
            serde_json::from_str(r#"{"recomender": {"top_k": 5}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.recommender, RecommenderConfig::default());
        assert_eq!(settings.conditioning, ConditioningConfig::default());
    }
}
