//! Line-by-line row parsing.

use exn::OptionExt;
use time::{Date, Month};
use tracing::instrument;

use crate::consts::{self, COLUMNS};
use crate::error::{ErrorKind, Result};
use crate::models::{ParsedRecord, SkipReason};

/// Validates the header line and returns a lazy iterator over the data rows.
///
/// The header must match [`HEADER`](crate::HEADER) case-insensitively, after
/// trimming surrounding whitespace, with the exact column count and order.
/// Any mismatch fails the call before a single data row is read.
///
/// Rows that fail validation are skipped and logged, never raised. The
/// returned [`Rows`] is single-pass and pulls one line at a time from `lines`.
#[instrument(level = "debug", skip(lines))]
pub fn parse<I>(lines: I) -> Result<Rows<I::IntoIter>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut lines = lines.into_iter();
    let header = lines.next();
    validate_header(header.as_ref().map(AsRef::as_ref))?;
    Ok(Rows { lines, line: 1, skipped: 0 })
}

fn validate_header(header: Option<&str>) -> Result<()> {
    let header = header.filter(|h| !h.trim().is_empty()).ok_or_raise(|| ErrorKind::MissingHeader)?;
    let columns: Vec<&str> = header.trim().split(',').collect();
    let matches = columns.len() == COLUMNS.len()
        && columns.iter().zip(COLUMNS).all(|(found, expected)| found.eq_ignore_ascii_case(expected));
    if !matches {
        exn::bail!(ErrorKind::InvalidHeader { found: header.to_string() });
    }
    Ok(())
}

/// Iterator over the accepted records of a tabular source.
///
/// Created by [`parse`]. Tracks the current (1-based) line number and how many
/// data rows were skipped so far.
#[derive(Debug)]
pub struct Rows<I> {
    lines: I,
    line: usize,
    skipped: usize,
}
impl<I> Rows<I> {
    /// Number of data rows skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Line number of the last line read, the header being line 1.
    pub fn line(&self) -> usize {
        self.line
    }
}
impl<I> Iterator for Rows<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = ParsedRecord;

    fn next(&mut self) -> Option<Self::Item> {
        for row in self.lines.by_ref() {
            self.line += 1;
            let row = row.as_ref();
            match parse_row(row) {
                Ok(record) => return Some(record),
                Err(reason) => {
                    self.skipped += 1;
                    tracing::warn!(line = self.line, %reason, row, "Skipped row");
                },
            }
        }
        None
    }
}

/// Validates a single data row and converts it into a [`ParsedRecord`].
pub fn parse_row(row: &str) -> std::result::Result<ParsedRecord, SkipReason> {
    if row.trim().is_empty() {
        return Err(SkipReason::Blank);
    }
    if consts::SPACE_BEFORE_COMMA.is_match(row) {
        return Err(SkipReason::SpaceBeforeComma);
    }
    let fields = split_fields(row.trim());
    let [title, pages, genre, release_date, author, publisher] = fields[..] else {
        return Err(SkipReason::FieldCount(fields.len()));
    };
    let release_date = parse_date(release_date.trim())?;
    let pages = parse_pages(pages.trim())?;
    Ok(ParsedRecord {
        title: title.trim().to_string(),
        pages,
        genre: genre.trim().to_string(),
        release_date,
        author: author.trim().to_string(),
        publisher: publisher.trim().to_string(),
    })
}

/// Splits on every comma that is directly followed by a non-whitespace
/// character, so `"Little, Brown and Company"` stays a single field.
fn split_fields(row: &str) -> Vec<&str> {
    let mut fields = Vec::with_capacity(COLUMNS.len());
    let mut start = 0;
    let mut chars = row.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == ',' && chars.peek().is_some_and(|(_, next)| !next.is_whitespace()) {
            fields.push(&row[start..i]);
            start = i + 1;
        }
    }
    fields.push(&row[start..]);
    fields
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> std::result::Result<Date, SkipReason> {
    let invalid = || SkipReason::InvalidDate(value.to_string());
    let captures = consts::DATE_REGEX.captures(value).ok_or_else(invalid)?;
    // Captures are ASCII digits of fixed width, so these parses cannot fail.
    let year: i32 = captures[1].parse().map_err(|_| invalid())?;
    let month: u8 = captures[2].parse().map_err(|_| invalid())?;
    let day: u8 = captures[3].parse().map_err(|_| invalid())?;
    let month = Month::try_from(month).map_err(|_| invalid())?;
    Date::from_calendar_date(year, month, day).map_err(|_| invalid())
}

fn parse_pages(value: &str) -> std::result::Result<u32, SkipReason> {
    let pages: i64 = value.parse().map_err(|_| SkipReason::InvalidPages(value.to_string()))?;
    if pages < 0 {
        return Err(SkipReason::NegativePages(pages));
    }
    u32::try_from(pages).map_err(|_| SkipReason::InvalidPages(value.to_string()))
}
