use crate::error::{ErrorKind, Result};
use crate::import::{ImportResult, import_records};
use bookshelf_catalog::CatalogStore;
use exn::ResultExt;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

const EXTENSION: &str = "csv";
const BOM: char = '\u{feff}';

/// Import the listing at `path` into `store`.
///
/// The path is checked before any I/O: it must not be blank and must have a
/// `.csv` extension (in any case). A file with no content imports nothing.
/// Otherwise the header is validated and the rows are handed to
/// [`import_records`]; rows that fail validation are skipped and only logged.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn import_file<S>(
    path: impl AsRef<Path>,
    store: &S,
    cancellation: &CancellationToken,
) -> Result<ImportResult>
where
    S: CatalogStore + ?Sized,
{
    let path = path.as_ref();
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        exn::bail!(ErrorKind::EmptyPath);
    }
    let supported = path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION));
    if !supported {
        exn::bail!(ErrorKind::UnsupportedFile(path.to_path_buf()));
    }

    // Rows are still parsed lazily, but the file itself is read up front.
    let bytes = tokio::fs::read(path).await.or_raise(|| ErrorKind::Read(path.to_path_buf()))?;
    // Invalid UTF-8 becomes U+FFFD, leaving the affected rows to validation.
    let content = String::from_utf8_lossy(&bytes);
    let content = content.strip_prefix(BOM).unwrap_or(&content);
    if content.trim().is_empty() {
        tracing::info!("Listing is empty");
        return Ok(ImportResult::default());
    }
    let mut rows = bookshelf_parse::parse(content.lines()).or_raise(|| ErrorKind::Parse)?;
    let result = import_records(store, rows.by_ref(), cancellation).await?;
    if rows.skipped() > 0 {
        tracing::warn!(skipped_rows = rows.skipped(), "Some rows were invalid and skipped");
    }
    Ok(result)
}
