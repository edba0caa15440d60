//! Tokenizer and validator for tabular book listings.
//!
//! Turns raw text lines into typed [`ParsedRecord`]s. The first line must be
//! the fixed six-column [`HEADER`]; every following line is either accepted as
//! one record or skipped with a logged [`SkipReason`]. A bad data row never
//! fails the call, only a bad header does.
//!
//! # Splitting
//! Columns are separated by a comma that is *not* followed by whitespace. That
//! keeps values such as `"Little, Brown and Company"` in one field while still
//! splitting the six top-level columns. Conversely, whitespace *before* a comma
//! marks the row as malformed.
//!
//! ```rust
//! use bookshelf_parse::{HEADER, parse};
//! let lines = [HEADER, "Dune,412,Sci-Fi,1965-08-01,Frank Herbert,Ace Books"];
//! let records: Vec<_> = parse(lines).unwrap().collect();
//! assert_eq!(records[0].author, "Frank Herbert");
//! ```

mod consts;
pub mod error;
mod models;
mod parser;

pub use crate::models::{ParsedRecord, SkipReason};
pub use crate::parser::{Rows, parse, parse_date, parse_row};

/// The only accepted header line.
pub const HEADER: &str = "Title,Pages,Genre,ReleaseDate,Author,Publisher";
