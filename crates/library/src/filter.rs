//! Reading search filters from JSON documents.

use crate::error::{ErrorKind, Result};
use bookshelf_catalog::models::Filter;
use exn::ResultExt;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use time::Date;
use tracing::instrument;

/// Property names are matched after lowercasing, so both `moreThanPages` and
/// `MoreThanPages` (or `more_than_pages`) are accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FilterDocument {
    title: Option<String>,
    genre: Option<String>,
    author: Option<String>,
    publisher: Option<String>,
    #[serde(rename = "morethanpages", alias = "more_than_pages")]
    more_than_pages: Option<i64>,
    #[serde(rename = "lessthanpages", alias = "less_than_pages")]
    less_than_pages: Option<i64>,
    #[serde(rename = "publishedafter", alias = "published_after")]
    published_after: Option<String>,
    #[serde(rename = "publishedbefore", alias = "published_before")]
    published_before: Option<String>,
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect::<Map<_, _>>()),
        other => other,
    }
}

fn parse_date(field: &str, value: Option<String>) -> Result<Option<Date>> {
    let Some(value) = value else { return Ok(None) };
    bookshelf_parse::parse_date(value.trim())
        .map(Some)
        .or_raise(|| ErrorKind::InvalidFilter(format!("{field} must be a YYYY-MM-DD date")))
}

/// Parse a filter from JSON text and validate its ranges.
pub fn parse_filter(json: &str) -> Result<Filter> {
    let value: Value =
        serde_json::from_str(json).or_raise(|| ErrorKind::InvalidFilter("malformed JSON".to_string()))?;
    if value.is_null() {
        exn::bail!(ErrorKind::InvalidFilter("document is null".to_string()));
    }
    let document: FilterDocument = serde_json::from_value(lowercase_keys(value))
        .or_raise(|| ErrorKind::InvalidFilter("unexpected document shape".to_string()))?;
    let filter = Filter {
        title: document.title,
        genre: document.genre,
        author: document.author,
        publisher: document.publisher,
        more_than_pages: document.more_than_pages,
        less_than_pages: document.less_than_pages,
        published_after: parse_date("publishedAfter", document.published_after)?,
        published_before: parse_date("publishedBefore", document.published_before)?,
    };
    if let (Some(more), Some(less)) = (filter.more_than_pages, filter.less_than_pages)
        && more >= less
    {
        exn::bail!(ErrorKind::InvalidFilter(format!("moreThanPages ({more}) must be less than lessThanPages ({less})")));
    }
    if let (Some(after), Some(before)) = (filter.published_after, filter.published_before)
        && after >= before
    {
        exn::bail!(ErrorKind::InvalidFilter(format!(
            "publishedAfter ({after}) must be earlier than publishedBefore ({before})"
        )));
    }
    Ok(filter)
}

/// Read a filter from the JSON document at `path`.
///
/// See [`parse_filter`] for the accepted format.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn read_filter(path: impl AsRef<Path>) -> Result<Filter> {
    let path = path.as_ref();
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        exn::bail!(ErrorKind::EmptyPath);
    }
    let json = tokio::fs::read_to_string(path).await.or_raise(|| ErrorKind::Read(path.to_path_buf()))?;
    parse_filter(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::ops::Deref;
    use time::Month;

    fn date(y: i32, m: Month, d: u8) -> Date {
        Date::from_calendar_date(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_full_filter() {
        let filter = parse_filter(
            r#"{
                "title": "War",
                "genre": "Novel",
                "author": "Tolstoy",
                "publisher": "Messenger",
                "moreThanPages": 100,
                "lessThanPages": 2000,
                "publishedAfter": "1800-01-01",
                "publishedBefore": "1900-12-31"
            }"#,
        )
        .unwrap();
        assert_eq!(
            filter,
            Filter {
                title: Some("War".to_string()),
                genre: Some("Novel".to_string()),
                author: Some("Tolstoy".to_string()),
                publisher: Some("Messenger".to_string()),
                more_than_pages: Some(100),
                less_than_pages: Some(2000),
                published_after: Some(date(1800, Month::January, 1)),
                published_before: Some(date(1900, Month::December, 31)),
            }
        );
    }

    #[rstest]
    #[case(r#"{"Title": "War"}"#)]
    #[case(r#"{"title": "War"}"#)]
    #[case(r#"{"TITLE": "War"}"#)]
    fn test_property_names_ignore_case(#[case] json: &str) {
        assert_eq!(parse_filter(json).unwrap().title.as_deref(), Some("War"));
    }

    #[rstest]
    #[case(r#"{"MoreThanPages": 10}"#)]
    #[case(r#"{"morethanpages": 10}"#)]
    #[case(r#"{"more_than_pages": 10}"#)]
    fn test_page_bound_spellings(#[case] json: &str) {
        assert_eq!(parse_filter(json).unwrap().more_than_pages, Some(10));
    }

    #[test]
    fn test_empty_object_is_empty_filter() {
        assert_eq!(parse_filter("{}").unwrap(), Filter::default());
    }

    #[test]
    fn test_unknown_properties_ignored() {
        assert_eq!(parse_filter(r#"{"colour": "red"}"#).unwrap(), Filter::default());
    }

    #[rstest]
    #[case::malformed("{ not json")]
    #[case::null("null")]
    #[case::wrong_shape("[1, 2, 3]")]
    #[case::wrong_type(r#"{"moreThanPages": "many"}"#)]
    #[case::bad_date(r#"{"publishedAfter": "01/02/2000"}"#)]
    #[case::pages_inverted(r#"{"moreThanPages": 500, "lessThanPages": 100}"#)]
    #[case::pages_equal(r#"{"moreThanPages": 100, "lessThanPages": 100}"#)]
    #[case::dates_inverted(r#"{"publishedAfter": "2000-01-01", "publishedBefore": "1999-01-01"}"#)]
    #[case::dates_equal(r#"{"publishedAfter": "2000-01-01", "publishedBefore": "2000-01-01"}"#)]
    fn test_invalid_filter(#[case] json: &str) {
        let err = parse_filter(json).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::InvalidFilter(_)), "{json}");
    }

    #[tokio::test]
    async fn test_read_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filter.json");
        std::fs::write(&path, r#"{"Author": "Orwell"}"#).unwrap();
        let filter = read_filter(&path).await.unwrap();
        assert_eq!(filter.author.as_deref(), Some("Orwell"));
    }

    #[tokio::test]
    async fn test_read_filter_empty_path() {
        let err = read_filter(" ").await.unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::EmptyPath));
    }

    #[tokio::test]
    async fn test_read_filter_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_filter(dir.path().join("missing.json")).await.unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Read(_)));
    }
}
