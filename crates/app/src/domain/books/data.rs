//! Book Data

use jiff::civil::Date;
use rust_decimal::Decimal;

use crate::domain::books::records::{BookFormat, BookUuid};

/// New Book Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub uuid: BookUuid,
    pub title: String,

    /// Author name; the author is created when first seen.
    pub author: String,

    pub description: String,
    pub price: Decimal,
    pub stock: u32,
    pub format: BookFormat,

    /// Category names; unknown categories are created.
    pub categories: Vec<String>,

    pub published_on: Option<Date>,
}

/// Catalog listing filter. Every criterion is optional and they combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    /// Exact category name.
    pub category: Option<String>,

    pub format: Option<BookFormat>,

    /// Case-insensitive substring of the title or the author name.
    pub search: Option<String>,
}
