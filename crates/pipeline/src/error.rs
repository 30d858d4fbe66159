//! Error types for the conditioning pipeline.

use thiserror::Error;

/// Errors raised while conditioning raw ratings
#[derive(Error, Debug)]
pub enum ConditioningError {
    /// Conditioning left no usable records
    ///
    /// Returned instead of an empty record set, so callers never build an
    /// empty matrix by accident.
    #[error("Insufficient data: {input} input records, {reason}")]
    InsufficientData { input: usize, reason: String },

    /// A configuration value is out of range
    #[error("Invalid conditioning config: {0}")]
    InvalidConfig(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ConditioningError>;
