use time::Date;

/// Search criteria for [`Repository::search`](crate::Repository::search).
///
/// Every present criterion must match. String criteria are trimmed and matched
/// as case-sensitive substrings; blank strings are ignored. Numeric and date
/// bounds are exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub more_than_pages: Option<i64>,
    pub less_than_pages: Option<i64>,
    pub published_after: Option<Date>,
    pub published_before: Option<Date>,
}
impl Filter {
    /// Trims a string criterion, treating blank as absent.
    pub(crate) fn normalize(value: Option<&String>) -> Option<&str> {
        value.map(|s| s.trim()).filter(|s| !s.is_empty())
    }
}
