//! Catalog Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// A write was rejected by a uniqueness constraint. Nothing from the
    /// rejected batch was persisted.
    #[display("uniqueness constraint violated")]
    Conflict,
    /// Stored data could not be converted back into a model.
    #[display("invalid catalog data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A conflict might not happen again, but retrying is a decision for
        // the caller that knows what the batch contained.
        matches!(self, Self::Database)
    }
}
