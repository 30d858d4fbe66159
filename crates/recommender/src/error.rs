//! Error types for the recommender crate.

use data_loader::{ItemId, UserId};
use thiserror::Error;

/// Errors returned by recommendation queries
///
/// Every variant describes the input data or the query; retrying the same
/// query against the same matrix gives the same error.
#[derive(Error, Debug)]
pub enum RecommendError {
    /// The query item is not a column of the rating matrix
    #[error("Unknown item: '{0}'")]
    UnknownItem(ItemId),

    /// The query user is not a row of the rating matrix
    #[error("Unknown user: '{0}'")]
    UnknownUser(UserId),

    /// Nothing could be scored against the query
    #[error("No candidates: {0}")]
    NoCandidates(String),

    /// A configuration value is out of range
    #[error("Invalid recommender config: {0}")]
    InvalidConfig(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RecommendError>;
