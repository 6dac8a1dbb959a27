//! Get Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    cart::{CartResponse, errors::into_status_error},
    extensions::*,
    state::State,
};

/// Get Cart Handler
///
/// Returns the caller's cart, creating an empty one on first access.
#[endpoint(
    tags("cart"),
    summary = "Get Cart",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;

    let cart = state
        .app
        .carts
        .get_cart(user.uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use bookstore_app::domain::carts::{MockCartsService, records::CartItemUuid};
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{
        cart::handlers::tests::{make_cart, make_item},
        test_helpers::{TestServices, customer, customer_service},
    };

    use super::*;

    #[tokio::test]
    async fn test_get_returns_callers_cart() -> TestResult {
        let cart = make_cart(vec![make_item(CartItemUuid::new(), 1)]);
        let cart_uuid = cart.uuid;

        let mut carts = MockCartsService::new();

        carts
            .expect_get_cart()
            .once()
            .withf(|user| *user == customer().uuid)
            .return_once(move |_| Ok(cart));

        let service = customer_service(
            TestServices {
                carts,
                ..TestServices::strict()
            },
            Router::with_path("cart").get(handler),
        );

        let mut res = TestClient::get("http://example.com/cart").send(&service).await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, cart_uuid.into_uuid());
        assert_eq!(body.items.len(), 1);
        assert_eq!(body.total, "25.99");

        Ok(())
    }
}
