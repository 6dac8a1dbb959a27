//! Add Cart Item Handler

use std::sync::Arc;

use bookstore_app::domain::{books::records::BookUuid, carts::data::NewCartItem};
use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    cart::{CartItemResponse, errors::into_status_error},
    extensions::*,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddCartItemRequest {
    pub book_uuid: Uuid,

    /// Units to add; defaults to one
    #[serde(default = "one")]
    pub quantity: u32,
}

const fn one() -> u32 {
    1
}

impl From<AddCartItemRequest> for NewCartItem {
    fn from(request: AddCartItemRequest) -> Self {
        NewCartItem {
            book_uuid: BookUuid::from_uuid(request.book_uuid),
            quantity: request.quantity,
        }
    }
}

/// Add Cart Item Handler
///
/// Adds units of a book to the caller's cart, merging with an existing item for that book.
#[endpoint(
    tags("cart"),
    summary = "Add Item to Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Cart item created or incremented"),
        (status_code = StatusCode::NOT_FOUND, description = "Book not found"),
        (status_code = StatusCode::CONFLICT, description = "Out of stock or stock exceeded"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Quantity below one"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartItemResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;

    let item = state
        .app
        .carts
        .add_item(user.uuid, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/cart/items/{}", item.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(item.into()))
}
