//! Books Repository

use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use rust_decimal::Decimal;
use smallvec::SmallVec;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use tracing::debug;
use uuid::Uuid;

use crate::{
    domain::books::{
        data::{BookFilter, NewBook},
        records::{BookRecord, BookStock, BookUuid},
    },
    uuids::raw_uuids,
};

const LIST_BOOKS_SQL: &str = include_str!("sql/list_books.sql");
const GET_BOOK_SQL: &str = include_str!("sql/get_book.sql");
const RELATED_BOOKS_SQL: &str = include_str!("sql/related_books.sql");
const UPSERT_AUTHOR_SQL: &str = include_str!("sql/upsert_author.sql");
const CREATE_BOOK_SQL: &str = include_str!("sql/create_book.sql");
const SYNC_CATEGORIES_SQL: &str = include_str!("sql/sync_categories.sql");
const ATTACH_CATEGORIES_SQL: &str = include_str!("sql/attach_categories.sql");
const GET_BOOK_STOCK_SQL: &str = include_str!("sql/get_book_stock.sql");
const LOCK_BOOKS_SQL: &str = include_str!("sql/lock_books.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBooksRepository;

impl PgBooksRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_books(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &BookFilter,
    ) -> Result<Vec<BookRecord>, sqlx::Error> {
        query_as::<Postgres, BookRecord>(LIST_BOOKS_SQL)
            .bind(filter.category.as_deref())
            .bind(filter.format.map(|format| format.as_str()))
            .bind(filter.search.as_deref())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_book(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book: BookUuid,
    ) -> Result<BookRecord, sqlx::Error> {
        query_as::<Postgres, BookRecord>(GET_BOOK_SQL)
            .bind(book.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn related_books(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book: BookUuid,
        limit: i64,
    ) -> Result<Vec<BookRecord>, sqlx::Error> {
        query_as::<Postgres, BookRecord>(RELATED_BOOKS_SQL)
            .bind(book.into_uuid())
            .bind(limit)
            .fetch_all(&mut **tx)
            .await
    }

    #[tracing::instrument(
        name = "books.repository.create_book",
        skip(self, tx, book),
        fields(book_uuid = %book.uuid, category_count = tracing::field::Empty),
        err
    )]
    pub(crate) async fn create_book(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book: NewBook,
    ) -> Result<BookRecord, sqlx::Error> {
        let stock = i32::try_from(book.stock).map_err(|e| sqlx::Error::ColumnDecode {
            index: "stock".to_string(),
            source: Box::new(e),
        })?;

        let author_uuid: Uuid = query_scalar(UPSERT_AUTHOR_SQL)
            .bind(Uuid::now_v7())
            .bind(&book.author)
            .fetch_one(&mut **tx)
            .await?;

        query(CREATE_BOOK_SQL)
            .bind(book.uuid.into_uuid())
            .bind(&book.title)
            .bind(author_uuid)
            .bind(&book.description)
            .bind(book.price)
            .bind(stock)
            .bind(book.format.as_str())
            .bind(book.published_on.map(SqlxDate::from))
            .execute(&mut **tx)
            .await?;

        let mut names = book.categories;

        names.sort_unstable();
        names.dedup();

        tracing::Span::current().record("category_count", names.len());

        if !names.is_empty() {
            let new_uuids: Vec<Uuid> = names.iter().map(|_| Uuid::now_v7()).collect();

            let category_uuids: Vec<Uuid> = query_scalar(SYNC_CATEGORIES_SQL)
                .bind(&new_uuids)
                .bind(&names)
                .fetch_all(&mut **tx)
                .await?;

            query(ATTACH_CATEGORIES_SQL)
                .bind(book.uuid.into_uuid())
                .bind(&category_uuids)
                .execute(&mut **tx)
                .await?;

            debug!(category_count = category_uuids.len(), "attached categories");
        }

        self.get_book(tx, book.uuid).await
    }

    pub(crate) async fn get_book_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book: BookUuid,
    ) -> Result<BookStock, sqlx::Error> {
        query_as::<Postgres, BookStock>(GET_BOOK_STOCK_SQL)
            .bind(book.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Row-lock the given books for the rest of the transaction.
    ///
    /// Locks are taken in ascending UUID order so overlapping checkouts always queue on the
    /// same row first. Unknown UUIDs are simply absent from the result.
    #[tracing::instrument(
        name = "books.repository.lock_books",
        skip(self, tx, books),
        fields(book_count = books.len()),
        err
    )]
    pub(crate) async fn lock_books(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        books: &[BookUuid],
    ) -> Result<Vec<BookStock>, sqlx::Error> {
        query_as::<Postgres, BookStock>(LOCK_BOOKS_SQL)
            .bind(raw_uuids(books))
            .fetch_all(&mut **tx)
            .await
    }

    /// Take `quantity` units out of stock. Returns `false` when the book does not hold that
    /// many units, in which case nothing changed.
    pub(crate) async fn decrement_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book: BookUuid,
        quantity: u32,
    ) -> Result<bool, sqlx::Error> {
        let quantity = i32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })?;

        let rows_affected = query(DECREMENT_STOCK_SQL)
            .bind(book.into_uuid())
            .bind(quantity)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }
}

fn stock_from_row(row: &PgRow) -> sqlx::Result<u32> {
    let stock: i32 = row.try_get("stock")?;

    u32::try_from(stock).map_err(|e| sqlx::Error::ColumnDecode {
        index: "stock".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for BookRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let format: String = row.try_get("format")?;

        let format = format.parse().map_err(|e| sqlx::Error::ColumnDecode {
            index: "format".to_string(),
            source: Box::new(e),
        })?;

        let categories: Vec<String> = row.try_get("categories")?;

        Ok(Self {
            uuid: BookUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            description: row.try_get("description")?,
            price: row.try_get::<Decimal, _>("price")?,
            stock: stock_from_row(row)?,
            format,
            categories: SmallVec::from_vec(categories),
            published_on: row
                .try_get::<Option<SqlxDate>, _>("published_on")?
                .map(SqlxDate::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for BookStock {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: BookUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            price: row.try_get("price")?,
            stock: stock_from_row(row)?,
        })
    }
}
