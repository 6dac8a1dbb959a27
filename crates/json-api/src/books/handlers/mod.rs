//! Book Handlers

pub(crate) mod get;
pub(crate) mod index;

use bookstore_app::domain::books::records::BookRecord;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Book Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BookResponse {
    /// The unique identifier of the book
    pub uuid: Uuid,

    pub title: String,
    pub author: String,
    pub description: String,

    /// Unit price as a decimal string, e.g. "25.99"
    pub price: String,

    /// Copies available for sale
    pub stock: u32,

    /// `physical` or `digital`
    pub format: String,

    pub categories: Vec<String>,

    /// Publication date (YYYY-MM-DD)
    pub published_on: Option<String>,
}

impl From<BookRecord> for BookResponse {
    fn from(book: BookRecord) -> Self {
        Self {
            uuid: book.uuid.into_uuid(),
            title: book.title,
            author: book.author,
            description: book.description,
            price: book.price.to_string(),
            stock: book.stock,
            format: book.format.to_string(),
            categories: book.categories.into_vec(),
            published_on: book.published_on.map(|date| date.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use bookstore_app::domain::books::records::{BookFormat, BookUuid};
    use jiff::Timestamp;
    use rust_decimal::Decimal;

    use super::*;

    pub(crate) fn make_book(uuid: BookUuid, title: &str) -> BookRecord {
        BookRecord {
            uuid,
            title: title.to_string(),
            author: "Frank Herbert".to_string(),
            description: String::new(),
            price: Decimal::new(25_99, 2),
            stock: 10,
            format: BookFormat::Physical,
            categories: ["Science Fiction".to_string()].into_iter().collect(),
            published_on: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_book_response_formats_price_and_format() {
        let response = BookResponse::from(make_book(BookUuid::new(), "Dune"));

        assert_eq!(response.price, "25.99");
        assert_eq!(response.format, "physical");
        assert_eq!(response.categories, vec!["Science Fiction".to_string()]);
    }
}
