//! Get Book Handler

use std::sync::Arc;

use bookstore_app::domain::books::records::BookUuid;
use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    books::{BookResponse, errors::into_status_error},
    extensions::*,
    state::State,
};

/// Book Detail Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BookDetailResponse {
    pub book: BookResponse,

    /// Up to four other books sharing a category with this one
    pub related: Vec<BookResponse>,
}

/// Get Book Handler
///
/// Returns a book with a few related titles.
#[endpoint(
    tags("books"),
    summary = "Get Book",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Book found"),
        (status_code = StatusCode::NOT_FOUND, description = "Book not found"),
    ),
)]
pub(crate) async fn handler(
    book: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<BookDetailResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let book = BookUuid::from_uuid(book.into_inner());

    let record = state
        .app
        .books
        .get_book(book)
        .await
        .map_err(into_status_error)?;

    let related = state
        .app
        .books
        .related_books(book)
        .await
        .map_err(into_status_error)?;

    Ok(Json(BookDetailResponse {
        book: record.into(),
        related: related.into_iter().map(Into::into).collect(),
    }))
}
