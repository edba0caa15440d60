//! The persistence contract the import engine is written against.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Batch, BookKey, Id, ReferenceKind};

/// Lookups and batch writes needed to merge new books into a catalog.
///
/// Implementations must make [`commit`](Self::commit) atomic: either every
/// entity in the batch is persisted, or none is.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Find the id of the reference entity of `kind` named `name`, ignoring case.
    async fn find_reference(&self, kind: ReferenceKind, name: &str) -> Result<Option<Id>>;

    /// Find the id of the book with exactly this business key.
    async fn find_book(&self, key: &BookKey) -> Result<Option<Id>>;

    /// Persist every entity in `batch` in one atomic operation.
    ///
    /// Returns [`ErrorKind::Conflict`](crate::error::ErrorKind::Conflict) if any
    /// uniqueness constraint rejects the batch, and
    /// [`ErrorKind::Database`](crate::error::ErrorKind::Database) for any other failure.
    async fn commit(&self, batch: &Batch) -> Result<()>;
}
