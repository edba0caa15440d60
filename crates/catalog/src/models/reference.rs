use crate::models::{Batch, Id};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// The three kinds of named entity shared between many books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Genre,
    Author,
    Publisher,
}
impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Genre => "genre",
            Self::Author => "author",
            Self::Publisher => "publisher",
        }
    }
}
impl Display for ReferenceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// The key reference names are unique by within their kind.
///
/// Names differing only in case, including non-ASCII letters, share a key.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// A named entity, unique by name (case-insensitive) within its kind.
///
/// Implemented by [`Genre`], [`Author`] and [`Publisher`] so that resolution
/// logic can be written once, generic over the kind.
pub trait Reference: Sized {
    const KIND: ReferenceKind;

    fn new(id: Id, name: String) -> Self;
    fn id(&self) -> Id;
    fn name(&self) -> &str;
    /// The list in `batch` that entities of this kind are staged into.
    fn staged(batch: &mut Batch) -> &mut Vec<Self>;
}

macro_rules! reference {
    ($(#[$meta:meta])* $name:ident, $kind:ident, $field:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            pub id: Id,
            pub name: String,
        }
        impl Reference for $name {
            const KIND: ReferenceKind = ReferenceKind::$kind;

            fn new(id: Id, name: String) -> Self {
                Self { id, name }
            }

            fn id(&self) -> Id {
                self.id
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn staged(batch: &mut Batch) -> &mut Vec<Self> {
                &mut batch.$field
            }
        }
    };
}

reference!(
    /// A genre, such as "Science Fiction".
    Genre,
    Genre,
    genres
);
reference!(
    /// A book author.
    Author,
    Author,
    authors
);
reference!(
    /// A publishing house.
    Publisher,
    Publisher,
    publishers
);
