//! Merging book listings into the catalog without creating duplicates.
//!
//! Each record passes through the same steps, strictly in input order:
//!
//! 1. Check for cancellation.
//! 2. Resolve genre, author and publisher to ids (cache, then store, then create).
//! 3. Skip the record if its [`BookKey`](bookshelf_catalog::models::BookKey)
//!    was already staged in this call, or already exists in the store.
//! 4. Otherwise stage a new book.
//!
//! Everything staged is then written in a single commit. If the commit is
//! rejected by a uniqueness constraint (another writer got there first), the
//! whole staged batch counts as duplicates and nothing is added.

mod context;
mod file;

use crate::error::{ErrorKind, Result};
use crate::import::context::{ImportContext, Outcome};
use bookshelf_catalog::CatalogStore;
use bookshelf_catalog::error::ErrorKind as CatalogErrorKind;
use bookshelf_parse::ParsedRecord;
use exn::ResultExt;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

pub use self::file::import_file;

/// Outcome of one import call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Books persisted by the commit.
    pub added: usize,
    /// Records that matched a book staged earlier in the call, a book already
    /// in the store, or that were part of a batch rejected at commit.
    pub skipped_duplicates: usize,
}

/// Import parsed records into `store`.
///
/// An empty sequence returns immediately without touching the store.
/// Cancellation is checked before each record and once more before the commit;
/// a cancelled import returns [`ErrorKind::Cancelled`] and persists nothing.
#[instrument(skip_all)]
pub async fn import_records<S, I>(store: &S, records: I, cancellation: &CancellationToken) -> Result<ImportResult>
where
    S: CatalogStore + ?Sized,
    I: IntoIterator<Item = ParsedRecord>,
{
    let mut records = records.into_iter().peekable();
    if records.peek().is_none() {
        tracing::info!("No records to import");
        return Ok(ImportResult::default());
    }

    let mut ctx = ImportContext::default();
    let mut result = ImportResult::default();
    for record in records {
        if cancellation.is_cancelled() {
            exn::bail!(ErrorKind::Cancelled);
        }
        match ctx.stage(store, record).await? {
            Outcome::Staged => {},
            Outcome::DuplicateInBatch | Outcome::DuplicateInStore => result.skipped_duplicates += 1,
        }
    }
    if cancellation.is_cancelled() {
        exn::bail!(ErrorKind::Cancelled);
    }

    let staged = ctx.staged_books();
    match store.commit(ctx.batch()).await {
        Ok(()) => result.added = staged,
        Err(err) if matches!(&*err, CatalogErrorKind::Conflict) => {
            tracing::warn!(staged, "Commit rejected by a uniqueness constraint; counting the batch as duplicates");
            result.skipped_duplicates += staged;
        },
        Err(err) => return Err(err).or_raise(|| ErrorKind::Catalog),
    }
    tracing::info!(added = result.added, skipped_duplicates = result.skipped_duplicates, "Import complete");
    Ok(result)
}
