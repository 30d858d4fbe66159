//! Ordering shared by every ranked list this crate returns.

use std::cmp::Ordering;

/// An entry of a ranked list: an identifier and a finite score
pub trait Ranked {
    fn id(&self) -> &str;
    fn score(&self) -> f64;
}

/// Descending score, then ascending identifier
pub fn compare_ranked<T: Ranked>(a: &T, b: &T) -> Ordering {
    b.score()
        .total_cmp(&a.score())
        .then_with(|| a.id().cmp(b.id()))
}

/// Sort with [`compare_ranked`] and keep the first `limit` entries.
///
/// Sorting happens before truncation, so the result does not depend on the
/// order the entries were produced in.
pub fn rank_and_truncate<T: Ranked>(mut entries: Vec<T>, limit: usize) -> Vec<T> {
    entries.sort_by(compare_ranked);
    entries.truncate(limit);
    entries
}
