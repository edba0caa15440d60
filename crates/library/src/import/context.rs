use crate::error::{ErrorKind, Result};
use bookshelf_catalog::CatalogStore;
use bookshelf_catalog::models::{Author, Batch, Book, BookKey, Genre, Id, Publisher, Reference, ReferenceKind, name_key};
use bookshelf_parse::ParsedRecord;
use exn::ResultExt;
use std::collections::{HashMap, HashSet};

/// Where a record ended up after [`ImportContext::stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Staged,
    DuplicateInBatch,
    DuplicateInStore,
}

/// State for a single import call.
///
/// Holds the name caches for each reference kind, the keys of books staged so
/// far, and the batch of new entities waiting to be committed. A fresh context
/// is created per call and dropped when the call returns, so nothing leaks
/// between imports.
#[derive(Debug, Default)]
pub(crate) struct ImportContext {
    genres: HashMap<String, Id>,
    authors: HashMap<String, Id>,
    publishers: HashMap<String, Id>,
    staged: HashSet<BookKey>,
    batch: Batch,
}
impl ImportContext {
    pub(crate) fn batch(&self) -> &Batch {
        &self.batch
    }

    pub(crate) fn staged_books(&self) -> usize {
        self.batch.books.len()
    }

    fn cache<R: Reference>(&mut self) -> &mut HashMap<String, Id> {
        match R::KIND {
            ReferenceKind::Genre => &mut self.genres,
            ReferenceKind::Author => &mut self.authors,
            ReferenceKind::Publisher => &mut self.publishers,
        }
    }

    /// Resolve `name` to the id of a reference entity of kind `R`.
    ///
    /// 1. **Cache** - a name already resolved during this call is reused.
    /// 2. **Store** - an existing entity with that name is reused.
    /// 3. **Create** - otherwise a new entity is staged for the commit.
    ///
    /// The cache is keyed by [`name_key`], the same key the store enforces
    /// uniqueness on, so `"Ace Books"` and `"ACE BOOKS"` resolve to one entity.
    pub(crate) async fn resolve<R, S>(&mut self, store: &S, name: &str) -> Result<Id>
    where
        R: Reference,
        S: CatalogStore + ?Sized,
    {
        let key = name_key(name);
        if let Some(id) = self.cache::<R>().get(&key) {
            return Ok(*id);
        }
        let existing = store.find_reference(R::KIND, name).await.or_raise(|| ErrorKind::Catalog)?;
        let id = match existing {
            Some(id) => {
                tracing::debug!(kind = %R::KIND, name, %id, "Found existing reference");
                id
            },
            None => {
                let id = Id::generate();
                R::staged(&mut self.batch).push(R::new(id, name.to_string()));
                tracing::debug!(kind = %R::KIND, name, %id, "Staged new reference");
                id
            },
        };
        self.cache::<R>().insert(key, id);
        Ok(id)
    }

    /// Resolve the references of `record`, then stage it as a new book unless
    /// its business key was already staged in this call or exists in the store.
    pub(crate) async fn stage<S>(&mut self, store: &S, record: ParsedRecord) -> Result<Outcome>
    where
        S: CatalogStore + ?Sized,
    {
        let genre_id = self.resolve::<Genre, _>(store, &record.genre).await?;
        let author_id = self.resolve::<Author, _>(store, &record.author).await?;
        let publisher_id = self.resolve::<Publisher, _>(store, &record.publisher).await?;
        let key = BookKey {
            title: record.title,
            author_id,
            publisher_id,
            release_date: record.release_date,
        };
        if self.staged.contains(&key) {
            return Ok(Outcome::DuplicateInBatch);
        }
        if store.find_book(&key).await.or_raise(|| ErrorKind::Catalog)?.is_some() {
            return Ok(Outcome::DuplicateInStore);
        }
        self.batch.books.push(Book {
            id: Id::generate(),
            title: key.title.clone(),
            pages: record.pages,
            genre_id,
            author_id,
            publisher_id,
            release_date: key.release_date,
        });
        self.staged.insert(key);
        Ok(Outcome::Staged)
    }
}
