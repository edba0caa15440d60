use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Column names, in order.
pub(crate) const COLUMNS: [&str; 6] = ["Title", "Pages", "Genre", "ReleaseDate", "Author", "Publisher"];

// Whitespace directly before a comma: "Title ,180". A separator is only ever
// ", " (inside a value) or "," (between columns), never " ,".
regex!(SPACE_BEFORE_COMMA, r"\s,");
// Strict `YYYY-MM-DD`, no time component.
regex!(DATE_REGEX, r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$");
