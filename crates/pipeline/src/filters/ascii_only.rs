//! Filter to drop records with non-ASCII identifiers.
//!
//! Scraped review exports carry mangled names and titles (mojibake,
//! stray symbols) that split one book into several columns.

use crate::error::Result;
use crate::traits::RecordFilter;
use data_loader::RatingRecord;

/// Keeps records whose user and item identifiers are pure ASCII.
pub struct AsciiOnlyFilter;

impl RecordFilter for AsciiOnlyFilter {
    fn name(&self) -> &str {
        "AsciiOnlyFilter"
    }

    fn apply(&self, records: Vec<RatingRecord>) -> Result<Vec<RatingRecord>> {
        let filtered: Vec<RatingRecord> = records
            .into_iter()
            .filter(|record| record.user_id.is_ascii() && record.item_id.is_ascii())
            .collect();
        Ok(filtered)
    }
}
