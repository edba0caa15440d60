//! Import, filter and export operations over a book catalog.
//!
//! - [`import_file`] / [`import_records`] merge listings into any
//!   [`CatalogStore`](bookshelf_catalog::CatalogStore) without creating
//!   duplicate books or reference entities.
//! - [`read_filter`] loads search criteria from a JSON document.
//! - [`write_export`] writes search results back out as a listing.

pub mod error;
mod export;
mod filter;
mod import;

pub use crate::export::{export_file_name, render, write_export};
pub use crate::filter::{parse_filter, read_filter};
pub use crate::import::{ImportResult, import_file, import_records};
