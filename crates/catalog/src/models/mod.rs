mod batch;
mod book;
mod filter;
mod id;
mod reference;
mod row;

pub use self::batch::Batch;
pub use self::book::{Book, BookKey, BookRecord};
pub use self::filter::Filter;
pub use self::id::Id;
pub use self::reference::{Author, Genre, Publisher, Reference, ReferenceKind, name_key};
pub(crate) use self::row::{BookRecordRow, BookRow, date_to_timestamp};
