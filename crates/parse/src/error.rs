//! Parse Error Types
//!
//! Only structural problems with the input are errors. A bad data row is never
//! an error: it is skipped and reported through [`SkipReason`](crate::SkipReason).

use derive_more::{Display, Error};

/// A parse error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for parse operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structural input errors.
///
/// Any of these fails the whole call before a single data row is read.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input had no first line, or the first line was blank.
    #[display("header line is missing or blank")]
    MissingHeader,
    /// The first line is not the expected six-column header.
    #[display("invalid header, expected '{}', found: '{found}'", crate::HEADER)]
    InvalidHeader {
        /// The header line as it appeared in the input.
        found: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Same input, same header.
        false
    }
}
