use crate::models::Id;
use time::Date;

/// A catalog entry.
///
/// No two books share the same [`BookKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: Id,
    pub title: String,
    pub pages: u32,
    pub genre_id: Id,
    pub author_id: Id,
    pub publisher_id: Id,
    pub release_date: Date,
}
impl Book {
    pub fn key(&self) -> BookKey {
        BookKey {
            title: self.title.clone(),
            author_id: self.author_id,
            publisher_id: self.publisher_id,
            release_date: self.release_date,
        }
    }
}

/// Business key identifying a logical duplicate book.
///
/// The title is compared literally. Author and publisher are compared by id,
/// so differently-cased names that resolve to the same entity collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookKey {
    pub title: String,
    pub author_id: Id,
    pub publisher_id: Id,
    pub release_date: Date,
}

/// A book joined with the names of its genre, author and publisher.
///
/// This is the six-column shape that listings are imported from and exported to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    pub title: String,
    pub pages: u32,
    pub genre: String,
    pub release_date: Date,
    pub author: String,
    pub publisher: String,
}
