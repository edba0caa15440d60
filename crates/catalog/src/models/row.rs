use crate::error::{Error, ErrorKind, Result};
use crate::models::{Book, BookRecord};
use exn::ResultExt;
use time::{Date, UtcDateTime};

/// Dates are stored as the unix timestamp of midnight UTC.
pub(crate) fn date_to_timestamp(date: Date) -> i64 {
    date.midnight().as_utc().unix_timestamp()
}

pub(crate) fn timestamp_to_date(timestamp: i64) -> Result<Date> {
    Ok(UtcDateTime::from_unix_timestamp(timestamp).or_raise(|| ErrorKind::InvalidData("release date"))?.date())
}

pub(crate) struct BookRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) pages: i64,
    pub(crate) genre_id: String,
    pub(crate) author_id: String,
    pub(crate) publisher_id: String,
    pub(crate) release_date: i64,
}
impl From<&Book> for BookRow {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.to_string(),
            title: book.title.clone(),
            pages: i64::from(book.pages),
            genre_id: book.genre_id.to_string(),
            author_id: book.author_id.to_string(),
            publisher_id: book.publisher_id.to_string(),
            release_date: date_to_timestamp(book.release_date),
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct BookRecordRow {
    title: String,
    pages: i64,
    genre: String,
    release_date: i64,
    author: String,
    publisher: String,
}
impl TryFrom<BookRecordRow> for BookRecord {
    type Error = Error;
    fn try_from(row: BookRecordRow) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            title: row.title,
            pages: u32::try_from(row.pages).or_raise(|| ErrorKind::InvalidData("pages"))?,
            genre: row.genre,
            release_date: timestamp_to_date(row.release_date)?,
            author: row.author,
            publisher: row.publisher,
        })
    }
}
