//! SQLite repository for books and their reference entities.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{
    Batch, BookKey, BookRecord, BookRecordRow, BookRow, Filter, Id, Reference, ReferenceKind, date_to_timestamp,
    name_key,
};
use crate::store::CatalogStore;
use async_trait::async_trait;
use exn::ResultExt;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::instrument;

/// Number of rows in each catalog table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct Counts {
    pub books: i64,
    pub genres: i64,
    pub authors: i64,
    pub publishers: i64,
}

/// Maps a write failure to [`ErrorKind::Conflict`] when a uniqueness
/// constraint rejected it, or [`ErrorKind::Database`] otherwise.
fn or_conflict<T>(result: sqlx::Result<T>) -> Result<T> {
    match result {
        Err(e) if e.as_database_error().is_some_and(|db| db.is_unique_violation()) => {
            Err(e).or_raise(|| ErrorKind::Conflict)
        },
        other => other.or_raise(|| ErrorKind::Database),
    }
}

/// Repository for reading and writing the catalog.
///
/// Genres, authors and publishers are unique by name, ignoring case. Books are
/// unique by [`BookKey`]. Both are enforced by the schema, so a conflicting
/// write fails even if the caller's own checks missed it.
///
/// In dry-run mode all lookups run as normal but [`commit`](CatalogStore::commit)
/// writes nothing.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    dry_run: bool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone(), dry_run: false }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool, dry_run: bool) -> Self {
        Self { pool, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// List the books matching every criterion in `filter`, ordered by title.
    ///
    /// An empty filter returns the whole catalog.
    #[instrument(skip(self))]
    pub async fn search(&self, filter: &Filter) -> Result<Vec<BookRecord>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(include_str!("../queries/search_books.sql"));
        // `instr` rather than `LIKE`: substring matching must stay case-sensitive.
        let substrings = [
            ("b.title", Filter::normalize(filter.title.as_ref())),
            ("g.name", Filter::normalize(filter.genre.as_ref())),
            ("a.name", Filter::normalize(filter.author.as_ref())),
            ("p.name", Filter::normalize(filter.publisher.as_ref())),
        ];
        for (column, value) in substrings {
            if let Some(value) = value {
                query.push(format!(" AND instr({column}, ")).push_bind(value.to_string()).push(") > 0");
            }
        }
        if let Some(pages) = filter.more_than_pages {
            query.push(" AND b.pages > ").push_bind(pages);
        }
        if let Some(pages) = filter.less_than_pages {
            query.push(" AND b.pages < ").push_bind(pages);
        }
        if let Some(date) = filter.published_after {
            query.push(" AND b.release_date > ").push_bind(date_to_timestamp(date));
        }
        if let Some(date) = filter.published_before {
            query.push(" AND b.release_date < ").push_bind(date_to_timestamp(date));
        }
        query.push(" ORDER BY b.title ASC");
        let rows: Vec<BookRecordRow> =
            query.build_query_as().fetch_all(&self.pool).await.or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(BookRecord::try_from).collect()
    }

    // =========================================================================
    // Counts
    // =========================================================================

    pub async fn counts(&self) -> Result<Counts> {
        sqlx::query_as(include_str!("../queries/count_all.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    // =========================================================================
    // Insert
    // =========================================================================

    async fn insert_references<R: Reference>(conn: &mut SqliteConnection, references: &[R]) -> Result<()> {
        let query = match R::KIND {
            ReferenceKind::Genre => include_str!("../queries/insert_genre.sql"),
            ReferenceKind::Author => include_str!("../queries/insert_author.sql"),
            ReferenceKind::Publisher => include_str!("../queries/insert_publisher.sql"),
        };
        for reference in references {
            or_conflict(
                sqlx::query(query)
                    .bind(reference.id().to_string())
                    .bind(reference.name())
                    .bind(name_key(reference.name()))
                    .execute(&mut *conn)
                    .await,
            )?;
        }
        Ok(())
    }

    async fn insert_book(conn: &mut SqliteConnection, row: BookRow) -> Result<()> {
        or_conflict(
            sqlx::query(include_str!("../queries/insert_book.sql"))
                .bind(row.id)
                .bind(row.title)
                .bind(row.pages)
                .bind(row.genre_id)
                .bind(row.author_id)
                .bind(row.publisher_id)
                .bind(row.release_date)
                .execute(conn)
                .await,
        )?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for Repository {
    async fn find_reference(&self, kind: ReferenceKind, name: &str) -> Result<Option<Id>> {
        let query = match kind {
            ReferenceKind::Genre => include_str!("../queries/find_genre.sql"),
            ReferenceKind::Author => include_str!("../queries/find_author.sql"),
            ReferenceKind::Publisher => include_str!("../queries/find_publisher.sql"),
        };
        let id: Option<String> = sqlx::query_scalar(query)
            .bind(name_key(name))
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        id.map(|id| id.parse()).transpose()
    }

    async fn find_book(&self, key: &BookKey) -> Result<Option<Id>> {
        let id: Option<String> = sqlx::query_scalar(include_str!("../queries/find_book.sql"))
            .bind(&key.title)
            .bind(key.author_id.to_string())
            .bind(key.publisher_id.to_string())
            .bind(date_to_timestamp(key.release_date))
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        id.map(|id| id.parse()).transpose()
    }

    #[instrument(skip_all, fields(
        genres = batch.genres.len(),
        authors = batch.authors.len(),
        publishers = batch.publishers.len(),
        books = batch.books.len(),
    ))]
    async fn commit(&self, batch: &Batch) -> Result<()> {
        if self.dry_run || batch.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        Self::insert_references(&mut tx, &batch.genres).await?;
        Self::insert_references(&mut tx, &batch.authors).await?;
        Self::insert_references(&mut tx, &batch.publishers).await?;
        for book in &batch.books {
            Self::insert_book(&mut tx, BookRow::from(book)).await?;
        }
        // Dropping the transaction on an early return above rolls it back.
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, Book, Genre, Publisher};
    use std::ops::Deref;
    use time::{Date, Month};

    struct Fixture {
        genre: Genre,
        author: Author,
        publisher: Publisher,
    }
    impl Fixture {
        fn new(genre: &str, author: &str, publisher: &str) -> Self {
            Self {
                genre: Genre::new(Id::generate(), genre.to_string()),
                author: Author::new(Id::generate(), author.to_string()),
                publisher: Publisher::new(Id::generate(), publisher.to_string()),
            }
        }

        fn book(&self, title: &str, pages: u32, (y, m, d): (i32, Month, u8)) -> Book {
            Book {
                id: Id::generate(),
                title: title.to_string(),
                pages,
                genre_id: self.genre.id,
                author_id: self.author.id,
                publisher_id: self.publisher.id,
                release_date: Date::from_calendar_date(y, m, d).unwrap(),
            }
        }

        fn batch(&self, books: Vec<Book>) -> Batch {
            Batch {
                genres: vec![self.genre.clone()],
                authors: vec![self.author.clone()],
                publishers: vec![self.publisher.clone()],
                books,
            }
        }
    }

    async fn repository() -> Repository {
        let db = Database::connect_in_memory().await.unwrap();
        Repository::from(&db)
    }

    async fn seeded() -> Repository {
        let repo = repository().await;
        let tolstoy = Fixture::new("Novel", "Leo Tolstoy", "The Russian Messenger");
        let orwell = Fixture::new("Dystopian Novel", "George Orwell", "Secker & Warburg");
        let sun_tzu = Fixture::new("Military Strategy", "Sun Tzu", "Luzac & Co.");
        repo.commit(&tolstoy.batch(vec![
            tolstoy.book("War and Peace", 1225, (1869, Month::January, 1)),
            tolstoy.book("Anna Karenina", 864, (1878, Month::January, 1)),
        ]))
        .await
        .unwrap();
        repo.commit(&orwell.batch(vec![
            orwell.book("Nineteen Eighty-Four", 328, (1949, Month::June, 8)),
            orwell.book("Animal Farm", 112, (1945, Month::August, 17)),
        ]))
        .await
        .unwrap();
        repo.commit(&sun_tzu.batch(vec![sun_tzu.book("The Art of War", 273, (1910, Month::January, 1))]))
            .await
            .unwrap();
        repo
    }

    fn titles(records: &[BookRecord]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_commit_and_find() {
        let repo = repository().await;
        let fixture = Fixture::new("Sci-Fi", "Frank Herbert", "Ace Books");
        let book = fixture.book("Dune", 412, (1965, Month::August, 1));
        repo.commit(&fixture.batch(vec![book.clone()])).await.unwrap();
        assert_eq!(repo.find_book(&book.key()).await.unwrap(), Some(book.id));
        assert_eq!(
            repo.find_reference(ReferenceKind::Author, "Frank Herbert").await.unwrap(),
            Some(fixture.author.id)
        );
        let counts = repo.counts().await.unwrap();
        assert_eq!(counts, Counts { books: 1, genres: 1, authors: 1, publishers: 1 });
    }

    #[tokio::test]
    async fn test_find_reference_ignores_case() {
        let repo = repository().await;
        let fixture = Fixture::new("Sci-Fi", "Frank Herbert", "Ace Books");
        repo.commit(&fixture.batch(vec![])).await.unwrap();
        assert_eq!(repo.find_reference(ReferenceKind::Genre, "sci-fi").await.unwrap(), Some(fixture.genre.id));
        assert_eq!(
            repo.find_reference(ReferenceKind::Publisher, "ACE BOOKS").await.unwrap(),
            Some(fixture.publisher.id)
        );
        // Kinds don't leak into each other.
        assert_eq!(repo.find_reference(ReferenceKind::Author, "Sci-Fi").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_reference_folds_non_ascii_case() {
        let repo = repository().await;
        let fixture = Fixture::new("Roman", "émile zola", "Charpentier");
        repo.commit(&fixture.batch(vec![])).await.unwrap();
        assert_eq!(
            repo.find_reference(ReferenceKind::Author, "ÉMILE ZOLA").await.unwrap(),
            Some(fixture.author.id)
        );
        assert_eq!(repo.find_reference(ReferenceKind::Author, "Emile Zola").await.unwrap(), None);

        let batch = Batch { authors: vec![Author::new(Id::generate(), "Émile Zola".to_string())], ..Batch::default() };
        let err = repo.commit(&batch).await.unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_find_book_title_is_literal() {
        let repo = repository().await;
        let fixture = Fixture::new("Sci-Fi", "Frank Herbert", "Ace Books");
        let book = fixture.book("Dune", 412, (1965, Month::August, 1));
        repo.commit(&fixture.batch(vec![book.clone()])).await.unwrap();
        let mut key = book.key();
        key.title = "DUNE".to_string();
        assert_eq!(repo.find_book(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_book_is_conflict_and_rolls_back() {
        let repo = repository().await;
        let fixture = Fixture::new("Sci-Fi", "Frank Herbert", "Ace Books");
        let book = fixture.book("Dune", 412, (1965, Month::August, 1));
        repo.commit(&fixture.batch(vec![book.clone()])).await.unwrap();

        let other = Fixture::new("Fantasy", "Ursula K. Le Guin", "Parnassus");
        let mut duplicate = book.clone();
        duplicate.id = Id::generate();
        let batch = Batch {
            genres: vec![other.genre.clone()],
            authors: vec![other.author.clone()],
            publishers: vec![other.publisher.clone()],
            books: vec![other.book("A Wizard of Earthsea", 183, (1968, Month::January, 1)), duplicate],
        };
        let err = repo.commit(&batch).await.unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Conflict));
        // Nothing from the rejected batch was written.
        let counts = repo.counts().await.unwrap();
        assert_eq!(counts, Counts { books: 1, genres: 1, authors: 1, publishers: 1 });
    }

    #[tokio::test]
    async fn test_duplicate_reference_name_is_conflict() {
        let repo = repository().await;
        let fixture = Fixture::new("Sci-Fi", "Frank Herbert", "Ace Books");
        repo.commit(&fixture.batch(vec![])).await.unwrap();
        let batch = Batch { authors: vec![Author::new(Id::generate(), "FRANK HERBERT".to_string())], ..Batch::default() };
        let err = repo.commit(&batch).await.unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_dry_run_commits_nothing() {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::new(db.pool().clone(), true);
        let fixture = Fixture::new("Sci-Fi", "Frank Herbert", "Ace Books");
        repo.commit(&fixture.batch(vec![fixture.book("Dune", 412, (1965, Month::August, 1))])).await.unwrap();
        assert_eq!(repo.counts().await.unwrap(), Counts::default());
    }

    #[tokio::test]
    async fn test_search_empty_filter_returns_all_ordered() {
        let repo = seeded().await;
        let records = repo.search(&Filter::default()).await.unwrap();
        assert_eq!(
            titles(&records),
            vec!["Animal Farm", "Anna Karenina", "Nineteen Eighty-Four", "The Art of War", "War and Peace"]
        );
        let war = records.iter().find(|r| r.title == "War and Peace").unwrap();
        assert_eq!(war.author, "Leo Tolstoy");
        assert_eq!(war.genre, "Novel");
        assert_eq!(war.release_date, Date::from_calendar_date(1869, Month::January, 1).unwrap());
    }

    #[tokio::test]
    async fn test_search_title_substring_trimmed() {
        let repo = seeded().await;
        let filter = Filter { title: Some("  War  ".to_string()), ..Filter::default() };
        let records = repo.search(&filter).await.unwrap();
        assert_eq!(titles(&records), vec!["The Art of War", "War and Peace"]);
    }

    #[tokio::test]
    async fn test_search_substring_is_case_sensitive() {
        let repo = seeded().await;
        let filter = Filter { title: Some("war".to_string()), ..Filter::default() };
        assert!(repo.search(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_blank_strings_ignored() {
        let repo = seeded().await;
        let filter = Filter { author: Some("   ".to_string()), genre: Some(String::new()), ..Filter::default() };
        assert_eq!(repo.search(&filter).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_search_reference_names() {
        let repo = seeded().await;
        let filter = Filter { genre: Some("Novel".to_string()), ..Filter::default() };
        let records = repo.search(&filter).await.unwrap();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.genre.contains("Novel")));

        let filter = Filter { publisher: Some("Warburg".to_string()), ..Filter::default() };
        let records = repo.search(&filter).await.unwrap();
        assert_eq!(titles(&records), vec!["Animal Farm", "Nineteen Eighty-Four"]);
    }

    #[tokio::test]
    async fn test_search_bounds_are_exclusive() {
        let repo = seeded().await;
        let filter = Filter { more_than_pages: Some(328), less_than_pages: Some(1225), ..Filter::default() };
        assert_eq!(titles(&repo.search(&filter).await.unwrap()), vec!["Anna Karenina"]);

        let filter = Filter {
            published_after: Some(Date::from_calendar_date(1945, Month::August, 17).unwrap()),
            published_before: Some(Date::from_calendar_date(1949, Month::June, 8).unwrap()),
            ..Filter::default()
        };
        assert!(repo.search(&filter).await.unwrap().is_empty());

        let filter = Filter {
            published_after: Some(Date::from_calendar_date(1945, Month::January, 1).unwrap()),
            ..Filter::default()
        };
        assert_eq!(titles(&repo.search(&filter).await.unwrap()), vec!["Animal Farm", "Nineteen Eighty-Four"]);
    }

    #[tokio::test]
    async fn test_search_criteria_are_combined() {
        let repo = seeded().await;
        let filter = Filter {
            author: Some("Orwell".to_string()),
            more_than_pages: Some(200),
            ..Filter::default()
        };
        assert_eq!(titles(&repo.search(&filter).await.unwrap()), vec!["Nineteen Eighty-Four"]);
    }
}
