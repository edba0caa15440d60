use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

/// Opaque, randomly generated entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(Uuid);
impl Id {
    /// Synthesize a new, unique identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}
impl From<Uuid> for Id {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
impl FromStr for Id {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s).or_raise(|| ErrorKind::InvalidData("id"))?))
    }
}
impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0.hyphenated())
    }
}
