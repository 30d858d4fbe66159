use data_loader::{CsvColumns, parser};
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let path = Path::new("data/br.csv");

    println!("Loading ratings from {}...\n", path.display());

    let start = Instant::now();
    let report = parser::parse_ratings_csv(path, &CsvColumns::default())?;
    let elapsed = start.elapsed();

    let complete = report
        .records
        .iter()
        .filter(|r| r.user_id.is_some() && r.item_id.is_some() && r.rating.is_some())
        .count();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Lines: {}", report.total_lines);
    println!("Skipped lines: {}", report.skipped_lines);
    println!("Records: {}", report.records.len());
    println!("Complete records: {}", complete);
    println!("\nPerformance: {:.0} lines/second",
             report.total_lines as f64 / elapsed.as_secs_f64());
    Ok(())
}
