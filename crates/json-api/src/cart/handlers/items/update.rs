//! Update Cart Item Handler

use std::sync::Arc;

use bookstore_app::domain::carts::records::{CartItemUuid, QuantityUpdate};
use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    cart::{CartItemResponse, errors::into_status_error},
    extensions::*,
    state::State,
};

/// Update Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCartItemRequest {
    /// New quantity; zero or less removes the item
    pub quantity: i64,
}

/// Update Cart Item Handler
///
/// Sets an item's quantity. Responds 204 when the quantity removed the item.
#[endpoint(
    tags("cart"),
    summary = "Set Cart Item Quantity",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Quantity updated"),
        (status_code = StatusCode::NO_CONTENT, description = "Item removed"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart item not found"),
        (status_code = StatusCode::CONFLICT, description = "Stock exceeded"),
    ),
)]
pub(crate) async fn handler(
    item: PathParam<Uuid>,
    json: JsonBody<UpdateCartItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;

    let update = state
        .app
        .carts
        .set_quantity(
            user.uuid,
            CartItemUuid::from_uuid(item.into_inner()),
            json.into_inner().quantity,
        )
        .await
        .map_err(into_status_error)?;

    match update {
        QuantityUpdate::Updated(item) => res.render(Json(CartItemResponse::from(item))),
        QuantityUpdate::Removed => {
            res.status_code(StatusCode::NO_CONTENT);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use bookstore_app::domain::carts::{CartsServiceError, MockCartsService, stock::StockError};
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        cart::handlers::tests::make_item,
        test_helpers::{TestServices, customer, customer_service},
    };

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        customer_service(
            TestServices {
                carts,
                ..TestServices::strict()
            },
            Router::with_path("cart/items/{item}").put(handler),
        )
    }

    #[tokio::test]
    async fn test_update_returns_item() -> TestResult {
        let item = CartItemUuid::new();
        let record = make_item(item, 3);

        let mut carts = MockCartsService::new();

        carts
            .expect_set_quantity()
            .once()
            .withf(move |user, i, quantity| *user == customer().uuid && *i == item && *quantity == 3)
            .return_once(move |_, _, _| Ok(QuantityUpdate::Updated(record)));

        let mut res = TestClient::put(format!("http://example.com/cart/items/{item}"))
            .json(&json!({ "quantity": 3 }))
            .send(&make_service(carts))
            .await;

        let body: CartItemResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.quantity, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_to_zero_returns_204() -> TestResult {
        let item = CartItemUuid::new();

        let mut carts = MockCartsService::new();

        carts
            .expect_set_quantity()
            .once()
            .withf(move |_, i, quantity| *i == item && *quantity == 0)
            .return_once(|_, _, _| Ok(QuantityUpdate::Removed));

        let res = TestClient::put(format!("http://example.com/cart/items/{item}"))
            .json(&json!({ "quantity": 0 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_above_stock_returns_409() -> TestResult {
        let item = CartItemUuid::new();

        let mut carts = MockCartsService::new();

        carts.expect_set_quantity().once().return_once(|_, _, _| {
            Err(CartsServiceError::Stock(StockError::StockExceeded {
                title: "Dune".to_string(),
                requested: 11,
                available: 10,
            }))
        });

        let res = TestClient::put(format!("http://example.com/cart/items/{item}"))
            .json(&json!({ "quantity": 11 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
