//! Parser for ratings CSV files.
//!
//! The GoodReads export has many columns; we only read three of them:
//! - reviewerName: the user
//! - title: the item
//! - reviewerRatings: the rating
//!
//! Column names are configurable through [`CsvColumns`]. Values are kept as
//! `Option`s: a blank field is a missing value for conditioning to drop,
//! not a parse failure. Lines the CSV reader rejects (wrong field count,
//! invalid UTF-8) or whose rating is not a number are skipped and counted.
//!
//! Rust concepts you'll learn here:
//! - The `csv` crate's reader and `StringRecord`
//! - Generic functions over `std::io::Read`
//! - Mapping library errors into our own error enum

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{info, warn};

/// Parse a ratings CSV file from disk
pub fn parse_ratings_csv(path: &Path, columns: &CsvColumns) -> Result<LoadReport> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    let report = parse_ratings_reader(file, columns)?;
    info!(
        path = %path.display(),
        records = report.records.len(),
        skipped = report.skipped_lines,
        "Loaded ratings file"
    );
    Ok(report)
}

/// Parse ratings CSV data from any reader
///
/// The first line must be a header containing the configured column names.
pub fn parse_ratings_reader<R: Read>(reader: R, columns: &CsvColumns) -> Result<LoadReport> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let user_col = column_position(&headers, &columns.user)?;
    let item_col = column_position(&headers, &columns.item)?;
    let rating_col = column_position(&headers, &columns.rating)?;

    let mut report = LoadReport::default();

    for result in csv_reader.records() {
        report.total_lines += 1;

        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(DataLoadError::Csv(e)),
            Err(e) => {
                warn!(error = %e, "Skipping malformed line");
                report.skipped_lines += 1;
                continue;
            }
        };

        let rating = match parse_rating(record.get(rating_col)) {
            Ok(rating) => rating,
            Err(reason) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                warn!(line, %reason, "Skipping line with invalid rating");
                report.skipped_lines += 1;
                continue;
            }
        };

        report.records.push(RawRecord {
            user_id: non_empty(record.get(user_col)),
            item_id: non_empty(record.get(item_col)),
            rating,
        });
    }

    Ok(report)
}

/// Find a header column by exact name
fn column_position(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| DataLoadError::MissingColumn {
            column: name.to_string(),
        })
}

fn non_empty(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a rating field
///
/// Example: "4" -> Ok(Some(4.0))
///          ""  -> Ok(None)
///          "x" -> Err(..)
fn parse_rating(field: Option<&str>) -> std::result::Result<Option<f32>, String> {
    let Some(text) = field.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match text.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        Ok(value) => Err(format!("rating is not finite: {value}")),
        Err(e) => Err(format!("Invalid rating '{text}': {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating(Some("4")), Ok(Some(4.0)));
        assert_eq!(parse_rating(Some(" 3.5 ")), Ok(Some(3.5)));
        assert_eq!(parse_rating(Some("")), Ok(None));
        assert_eq!(parse_rating(None), Ok(None));
        assert!(parse_rating(Some("five")).is_err());
        assert!(parse_rating(Some("NaN")).is_err());
    }

    #[test]
    fn test_parse_reader_default_columns() {
        let data = "\
title,reviewerName,reviewerRatings,reviewText
\"Anne of Avonlea\",Maureen,5,lovely
\"Dune, Messiah\",Paul,4,
Emma,,3,no reviewer
";
        let report = parse_ratings_reader(data.as_bytes(), &CsvColumns::default()).unwrap();

        assert_eq!(report.total_lines, 3);
        assert_eq!(report.skipped_lines, 0);
        assert_eq!(
            report.records[0],
            RawRecord::new("Maureen", "Anne of Avonlea", 5.0)
        );
        // quoted comma stays inside the title
        assert_eq!(report.records[1].item_id.as_deref(), Some("Dune, Messiah"));
        // blank field is missing, not an error
        assert_eq!(report.records[2].user_id, None);
        assert_eq!(report.records[2].rating, Some(3.0));
    }

    #[test]
    fn test_parse_reader_skips_bad_lines() {
        let data = "\
reviewerName,title,reviewerRatings
Maureen,Emma,5
Paul,Dune
Jane,Persuasion,great
Ann,Ulysses,2
";
        let report = parse_ratings_reader(data.as_bytes(), &CsvColumns::default()).unwrap();

        assert_eq!(report.total_lines, 4);
        assert_eq!(report.skipped_lines, 2);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[1], RawRecord::new("Ann", "Ulysses", 2.0));
    }

    #[test]
    fn test_parse_reader_custom_columns() {
        let data = "user,book,stars\nu1,b1,4\n";
        let columns = CsvColumns {
            user: "user".to_string(),
            item: "book".to_string(),
            rating: "stars".to_string(),
        };
        let report = parse_ratings_reader(data.as_bytes(), &columns).unwrap();
        assert_eq!(report.records, vec![RawRecord::new("u1", "b1", 4.0)]);
    }

    #[test]
    fn test_missing_column() {
        let data = "user,book\nu1,b1\n";
        let err = parse_ratings_reader(data.as_bytes(), &CsvColumns::default()).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn { column } if column == "reviewerName"));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_ratings_csv(
            Path::new("definitely/not/here.csv"),
            &CsvColumns::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
