use std::fmt::{Display, Formatter, Result as FmtResult};
use time::Date;

/// One accepted input row, fields trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedRecord {
    pub title: String,
    pub pages: u32,
    pub genre: String,
    pub release_date: Date,
    pub author: String,
    pub publisher: String,
}

/// Why a data row produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty or whitespace-only line.
    Blank,
    /// Whitespace directly before a comma, most likely a quoting typo.
    SpaceBeforeComma,
    /// Splitting did not produce exactly six fields.
    FieldCount(usize),
    /// The release date is not a real `YYYY-MM-DD` calendar date.
    InvalidDate(String),
    /// The page count is not a base-10 integer (or does not fit).
    InvalidPages(String),
    /// The page count is below zero.
    NegativePages(i64),
}
impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Blank => write!(f, "row is empty or whitespace"),
            Self::SpaceBeforeComma => write!(f, "space before comma"),
            Self::FieldCount(n) => write!(f, "expected 6 fields, found {n}"),
            Self::InvalidDate(value) => write!(f, "release date '{value}' is not in the format YYYY-MM-DD"),
            Self::InvalidPages(value) => write!(f, "page count '{value}' is not a valid integer"),
            Self::NegativePages(value) => write!(f, "page count {value} is less than 0"),
        }
    }
}
impl std::error::Error for SkipReason {}
