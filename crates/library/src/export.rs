//! Writing search results back out as a listing.

use crate::error::{ErrorKind, Result};
use bookshelf_catalog::models::BookRecord;
use bookshelf_parse::HEADER;
use exn::ResultExt;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use time::UtcDateTime;
use tracing::instrument;

/// Name of an export written at `now`, e.g. `books_20250916_143005Z.csv`.
pub fn export_file_name(now: UtcDateTime) -> String {
    format!(
        "books_{:04}{:02}{:02}_{:02}{:02}{:02}Z.csv",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
    )
}

/// Render `records` as a listing: the six-column header, then one row each.
///
/// Values are written verbatim, so the output can be imported again.
pub fn render(records: &[BookRecord]) -> String {
    let mut out = String::with_capacity(HEADER.len() + 1 + records.len() * 64);
    out.push_str(HEADER);
    out.push('\n');
    for record in records {
        let date = record.release_date;
        // Writing to a String can't fail.
        _ = writeln!(
            out,
            "{},{},{},{:04}-{:02}-{:02},{},{}",
            record.title,
            record.pages,
            record.genre,
            date.year(),
            u8::from(date.month()),
            date.day(),
            record.author,
            record.publisher,
        );
    }
    out
}

/// Write `records` to a new timestamped listing inside `dir`, creating the
/// directory if needed. Returns the path of the written file.
#[instrument(skip_all, fields(dir = %dir.as_ref().display(), count = records.len()))]
pub async fn write_export(records: &[BookRecord], dir: impl AsRef<Path>, now: UtcDateTime) -> Result<PathBuf> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await.or_raise(|| ErrorKind::Export)?;
    let path = dir.join(export_file_name(now));
    tokio::fs::write(&path, render(records)).await.or_raise(|| ErrorKind::Export)?;
    tracing::info!(path = %path.display(), "Export written");
    Ok(path)
}
