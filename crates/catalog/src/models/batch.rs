use crate::models::{Author, Book, Genre, Publisher};

/// New entities waiting to be written in a single commit.
///
/// References are written before books so that foreign keys resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub genres: Vec<Genre>,
    pub authors: Vec<Author>,
    pub publishers: Vec<Publisher>,
    pub books: Vec<Book>,
}
impl Batch {
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty() && self.authors.is_empty() && self.publishers.is_empty() && self.books.is_empty()
    }
}
