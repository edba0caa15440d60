//! CLI Error Types

use derive_more::{Display, Error};

/// A command error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Which part of a command failed.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not open the catalog")]
    Catalog,
    #[display("import failed")]
    Import,
    #[display("search failed")]
    Search,
    #[display("export failed")]
    Export,
}
