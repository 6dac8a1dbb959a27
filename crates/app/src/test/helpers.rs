//! Test Helpers

use jiff::{SignedDuration, Timestamp};
use rust_decimal::Decimal;

use crate::{
    domain::{
        books::{
            BooksService, BooksServiceError,
            data::NewBook,
            records::{BookFormat, BookRecord, BookUuid},
        },
        coupons::{data::NewCoupon, records::CouponUuid},
    },
    test::TestContext,
};

pub(crate) fn new_book(title: &str, price: Decimal, stock: u32) -> NewBook {
    NewBook {
        uuid: BookUuid::new(),
        title: title.to_string(),
        author: "Test Author".to_string(),
        description: String::new(),
        price,
        stock,
        format: BookFormat::Physical,
        categories: Vec::new(),
        published_on: None,
    }
}

pub(crate) async fn create_book(
    ctx: &TestContext,
    title: &str,
    price: Decimal,
    stock: u32,
) -> Result<BookRecord, BooksServiceError> {
    ctx.books.create_book(new_book(title, price, stock)).await
}

/// An active coupon valid from an hour before `now` until an hour after it.
pub(crate) fn new_coupon(code: &str, discount: u8, now: Timestamp) -> NewCoupon {
    NewCoupon {
        uuid: CouponUuid::new(),
        code: code.to_string(),
        discount,
        starts_at: now - SignedDuration::from_hours(1),
        expires_at: now + SignedDuration::from_hours(1),
        active: true,
    }
}

pub(crate) async fn book_stock(ctx: &TestContext, book: BookUuid) -> Result<u32, BooksServiceError> {
    Ok(ctx.books.get_book(book).await?.stock)
}

/// Overwrite a book's stock behind the services' back, as a concurrent sale would.
pub(crate) async fn set_stock(ctx: &TestContext, book: BookUuid, stock: i32) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE books SET stock = $2 WHERE uuid = $1")
        .bind(book.into_uuid())
        .bind(stock)
        .execute(ctx.db.pool())
        .await?;

    Ok(())
}

pub(crate) async fn count_orders(ctx: &TestContext) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(ctx.db.pool())
        .await
}

pub(crate) async fn count_order_lines(ctx: &TestContext) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM order_lines")
        .fetch_one(ctx.db.pool())
        .await
}
