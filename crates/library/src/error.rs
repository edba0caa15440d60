//! Library Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Errors raised by the parse and catalog crates are kept
//! as children of a [`Parse`](ErrorKind::Parse) or
//! [`Catalog`](ErrorKind::Catalog) frame.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Only `.csv` listings can be imported.
    #[display("unsupported file, only .csv files can be imported: {}", _0.display())]
    UnsupportedFile(#[error(not(source))] PathBuf),
    #[display("path is empty")]
    EmptyPath,
    /// The source could not be read. Distinct from [`Parse`](Self::Parse):
    /// nothing was validated yet.
    #[display("could not read {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    /// The listing is structurally invalid (missing or wrong header).
    #[display("invalid listing")]
    Parse,
    #[display("catalog operation failed")]
    Catalog,
    #[display("import cancelled")]
    Cancelled,
    #[display("invalid filter: {_0}")]
    InvalidFilter(#[error(not(source))] String),
    #[display("could not write export")]
    Export,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Catalog | Self::Export)
    }
}
