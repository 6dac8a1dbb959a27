//! Books service.

use async_trait::async_trait;
use mockall::automock;
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::books::{
        data::{BookFilter, NewBook},
        errors::BooksServiceError,
        records::{BookRecord, BookUuid},
        repository::PgBooksRepository,
    },
};

/// How many related books a detail page shows.
pub const RELATED_BOOKS_LIMIT: i64 = 4;

#[derive(Debug, Clone)]
pub struct PgBooksService {
    db: Db,
    repository: PgBooksRepository,
}

impl PgBooksService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgBooksRepository::new(),
        }
    }
}

#[async_trait]
impl BooksService for PgBooksService {
    #[tracing::instrument(
        name = "books.service.list_books",
        skip(self, filter),
        fields(
            category = filter.category.as_deref(),
            format = filter.format.map(|format| format.as_str()),
            has_search = filter.search.is_some(),
            book_count = tracing::field::Empty
        ),
        err
    )]
    async fn list_books(&self, filter: BookFilter) -> Result<Vec<BookRecord>, BooksServiceError> {
        let mut tx = self.db.begin().await?;

        let books = self.repository.list_books(&mut tx, &filter).await?;

        tx.commit().await?;

        Span::current().record("book_count", books.len());

        Ok(books)
    }

    async fn get_book(&self, book: BookUuid) -> Result<BookRecord, BooksServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.get_book(&mut tx, book).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn related_books(&self, book: BookUuid) -> Result<Vec<BookRecord>, BooksServiceError> {
        let mut tx = self.db.begin().await?;

        let related = self
            .repository
            .related_books(&mut tx, book, RELATED_BOOKS_LIMIT)
            .await?;

        tx.commit().await?;

        Ok(related)
    }

    #[tracing::instrument(
        name = "books.service.create_book",
        skip(self, book),
        fields(book_uuid = %book.uuid, stock = book.stock),
        err
    )]
    async fn create_book(&self, book: NewBook) -> Result<BookRecord, BooksServiceError> {
        i32::try_from(book.stock)?;

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_book(&mut tx, book).await?;

        tx.commit().await?;

        info!(book_uuid = %created.uuid, title = %created.title, "created book");

        Ok(created)
    }
}

#[automock]
#[async_trait]
/// Catalog reads, plus the seeding write used by the CLI.
pub trait BooksService: Send + Sync {
    /// List books matching every criterion in `filter`, ordered by title.
    async fn list_books(&self, filter: BookFilter) -> Result<Vec<BookRecord>, BooksServiceError>;

    /// Retrieve a single book.
    async fn get_book(&self, book: BookUuid) -> Result<BookRecord, BooksServiceError>;

    /// Up to four other books sharing at least one category with `book`.
    async fn related_books(&self, book: BookUuid) -> Result<Vec<BookRecord>, BooksServiceError>;

    /// Add a book to the catalog, creating its author and categories as needed.
    async fn create_book(&self, book: NewBook) -> Result<BookRecord, BooksServiceError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        domain::books::records::BookFormat,
        test::{TestContext, helpers::new_book},
    };

    use super::*;

    #[tokio::test]
    async fn create_book_returns_full_record() -> TestResult {
        let ctx = TestContext::new().await;

        let mut book = new_book("The Rust Book", Decimal::new(39_99, 2), 7);

        book.author = "Steve Klabnik".to_string();
        book.categories = vec!["programming".to_string(), "rust".to_string()];

        let uuid = book.uuid;
        let created = ctx.books.create_book(book).await?;

        assert_eq!(created.uuid, uuid);
        assert_eq!(created.title, "The Rust Book");
        assert_eq!(created.author, "Steve Klabnik");
        assert_eq!(created.price, Decimal::new(39_99, 2));
        assert_eq!(created.stock, 7);
        assert_eq!(created.format, BookFormat::Physical);
        assert_eq!(created.categories.as_slice(), ["programming", "rust"]);

        Ok(())
    }

    #[tokio::test]
    async fn create_book_reuses_existing_author_and_category() -> TestResult {
        let ctx = TestContext::new().await;

        let mut first = new_book("First", Decimal::ONE, 1);
        first.author = "Shared Author".to_string();
        first.categories = vec!["fiction".to_string()];

        let mut second = new_book("Second", Decimal::ONE, 1);
        second.author = "Shared Author".to_string();
        second.categories = vec!["fiction".to_string(), "fiction".to_string()];

        ctx.books.create_book(first).await?;
        let second = ctx.books.create_book(second).await?;

        assert_eq!(second.author, "Shared Author");
        assert_eq!(second.categories.as_slice(), ["fiction"]);

        Ok(())
    }

    #[tokio::test]
    async fn create_book_negative_price_returns_invalid_data() {
        let ctx = TestContext::new().await;

        let result = ctx
            .books
            .create_book(new_book("Cheap", Decimal::new(-1, 2), 1))
            .await;

        assert!(
            matches!(result, Err(BooksServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );
    }

    #[tokio::test]
    async fn get_book_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.books.get_book(BookUuid::new()).await;

        assert!(
            matches!(result, Err(BooksServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_books_filters_by_category_format_and_search() -> TestResult {
        let ctx = TestContext::new().await;

        let mut dune = new_book("Dune", Decimal::TEN, 3);
        dune.author = "Frank Herbert".to_string();
        dune.categories = vec!["science fiction".to_string()];

        let mut emma = new_book("Emma", Decimal::TEN, 3);
        emma.author = "Jane Austen".to_string();
        emma.format = BookFormat::Digital;
        emma.categories = vec!["classics".to_string()];

        let dune = ctx.books.create_book(dune).await?;
        let emma = ctx.books.create_book(emma).await?;

        let all = ctx.books.list_books(BookFilter::default()).await?;
        assert_eq!(all.len(), 2);

        let by_category = ctx
            .books
            .list_books(BookFilter {
                category: Some("classics".to_string()),
                ..BookFilter::default()
            })
            .await?;
        assert_eq!(by_category.iter().map(|b| b.uuid).collect::<Vec<_>>(), [emma.uuid]);

        let by_format = ctx
            .books
            .list_books(BookFilter {
                format: Some(BookFormat::Physical),
                ..BookFilter::default()
            })
            .await?;
        assert_eq!(by_format.iter().map(|b| b.uuid).collect::<Vec<_>>(), [dune.uuid]);

        let by_author = ctx
            .books
            .list_books(BookFilter {
                search: Some("herb".to_string()),
                ..BookFilter::default()
            })
            .await?;
        assert_eq!(by_author.iter().map(|b| b.uuid).collect::<Vec<_>>(), [dune.uuid]);

        let by_title = ctx
            .books
            .list_books(BookFilter {
                search: Some("EMM".to_string()),
                ..BookFilter::default()
            })
            .await?;
        assert_eq!(by_title.iter().map(|b| b.uuid).collect::<Vec<_>>(), [emma.uuid]);

        Ok(())
    }

    #[tokio::test]
    async fn related_books_share_a_category_and_are_capped() -> TestResult {
        let ctx = TestContext::new().await;

        let mut source = new_book("Source", Decimal::ONE, 1);
        source.categories = vec!["poetry".to_string()];
        let source = ctx.books.create_book(source).await?;

        for index in 0..5 {
            let mut related = new_book(&format!("Related {index}"), Decimal::ONE, 1);
            related.categories = vec!["poetry".to_string()];
            ctx.books.create_book(related).await?;
        }

        let mut unrelated = new_book("Unrelated", Decimal::ONE, 1);
        unrelated.categories = vec!["cooking".to_string()];
        let unrelated = ctx.books.create_book(unrelated).await?;

        let related = ctx.books.related_books(source.uuid).await?;

        assert_eq!(related.len(), 4);
        assert!(related.iter().all(|b| b.uuid != source.uuid));
        assert!(related.iter().all(|b| b.uuid != unrelated.uuid));

        Ok(())
    }
}
