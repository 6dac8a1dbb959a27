//! Book Records

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use smallvec::SmallVec;
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Book UUID
pub type BookUuid = TypedUuid<BookRecord>;

/// Physical or digital edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookFormat {
    Physical,
    Digital,
}

impl BookFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Digital => "digital",
        }
    }
}

impl Display for BookFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown book format `{0}`")]
pub struct UnknownBookFormat(pub String);

impl FromStr for BookFormat {
    type Err = UnknownBookFormat;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "physical" => Ok(Self::Physical),
            "digital" => Ok(Self::Digital),
            other => Err(UnknownBookFormat(other.to_string())),
        }
    }
}

/// Book Record
#[derive(Debug, Clone)]
pub struct BookRecord {
    pub uuid: BookUuid,
    pub title: String,

    /// Author display name.
    pub author: String,

    pub description: String,
    pub price: Decimal,

    /// Units available for sale.
    pub stock: u32,

    pub format: BookFormat,

    /// Category names, sorted.
    pub categories: SmallVec<[String; 3]>,

    pub published_on: Option<Date>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The slice of a book that cart and checkout work with: enough to price a line and check
/// it against inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookStock {
    pub uuid: BookUuid,
    pub title: String,
    pub price: Decimal,
    pub stock: u32,
}
