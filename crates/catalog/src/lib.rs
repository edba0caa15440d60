//! SQLite catalog of books and the named entities they reference.
//!
//! # Architecture
//! The catalog stores four entity types:
//! - **Genres**, **Authors** and **Publishers**: reference entities, each
//!   unique by name within its kind (case-insensitive).
//! - **Books**: unique by their business key (title, author, publisher,
//!   release date), enforced by a schema constraint.
//!
//! Writers go through the [`CatalogStore`] contract, which the SQLite
//! [`Repository`] implements. Reads for listing and export go through
//! [`Repository::search`].

mod db;
pub mod error;
pub mod models;
mod repo;
mod store;

pub use crate::db::Database;
pub use crate::repo::{Counts, Repository};
pub use crate::store::CatalogStore;
