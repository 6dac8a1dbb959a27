//! Book Index Handler

use std::sync::Arc;

use bookstore_app::domain::books::{data::BookFilter, records::BookFormat};
use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    books::{BookResponse, errors::into_status_error},
    extensions::*,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BooksResponse {
    /// The matching books, ordered by title
    pub books: Vec<BookResponse>,
}

/// Book Index Handler
///
/// Lists the catalog, optionally narrowed by category, format and a search term matched
/// against title and author.
#[endpoint(
    tags("books"),
    summary = "List Books",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    category: QueryParam<String, false>,
    format: QueryParam<String, false>,
    q: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<BooksResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let format = format
        .into_inner()
        .map(|value| value.parse::<BookFormat>())
        .transpose()
        .or_400("could not parse \"format\" query parameter")?;

    let filter = BookFilter {
        category: non_blank(category.into_inner()),
        format,
        search: non_blank(q.into_inner()),
    };

    let books = state
        .app
        .books
        .list_books(filter)
        .await
        .map_err(into_status_error)?;

    Ok(Json(BooksResponse {
        books: books.into_iter().map(Into::into).collect(),
    }))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use bookstore_app::domain::books::{BooksServiceError, MockBooksService, records::BookUuid};
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{
        books::handlers::tests::make_book,
        test_helpers::{TestServices, customer_service},
    };

    use super::*;

    fn make_service(books: MockBooksService) -> Service {
        customer_service(
            TestServices {
                books,
                ..TestServices::strict()
            },
            Router::with_path("books").get(handler),
        )
    }

    #[tokio::test]
    async fn test_index_without_filters_lists_everything() -> TestResult {
        let mut books = MockBooksService::new();
        let book = make_book(BookUuid::new(), "Dune");

        books
            .expect_list_books()
            .once()
            .withf(|filter| *filter == BookFilter::default())
            .return_once(move |_| Ok(vec![book]));

        let mut res = TestClient::get("http://example.com/books")
            .send(&make_service(books))
            .await;

        let body: BooksResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.books.len(), 1);
        assert_eq!(body.books.first().map(|b| b.title.as_str()), Some("Dune"));

        Ok(())
    }

    #[tokio::test]
    async fn test_index_forwards_filters() -> TestResult {
        let mut books = MockBooksService::new();

        books
            .expect_list_books()
            .once()
            .withf(|filter| {
                *filter
                    == BookFilter {
                        category: Some("Fantasy".to_string()),
                        format: Some(BookFormat::Digital),
                        search: Some("tolkien".to_string()),
                    }
            })
            .return_once(|_| Ok(Vec::new()));

        let res = TestClient::get("http://example.com/books?category=Fantasy&format=digital&q=tolkien")
            .send(&make_service(books))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_index_unknown_format_returns_400() -> TestResult {
        let mut books = MockBooksService::new();

        books.expect_list_books().never();

        let res = TestClient::get("http://example.com/books?format=audiobook")
            .send(&make_service(books))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_index_storage_failure_returns_500() -> TestResult {
        let mut books = MockBooksService::new();

        books
            .expect_list_books()
            .once()
            .return_once(|_| Err(BooksServiceError::Sql(sqlx::Error::PoolTimedOut)));

        let res = TestClient::get("http://example.com/books")
            .send(&make_service(books))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }
}
