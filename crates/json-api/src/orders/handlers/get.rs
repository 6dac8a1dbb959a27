//! Get Order Handler

use std::sync::Arc;

use bookstore_app::domain::orders::number::OrderNumber;
use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    extensions::*,
    orders::{OrderResponse, errors::into_status_error},
    state::State,
};

/// Get Order Handler
///
/// Looks up one of the caller's orders by number. Other customers' orders are reported as
/// not found.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Malformed order number"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
pub(crate) async fn handler(
    number: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;

    let number = number
        .into_inner()
        .parse::<OrderNumber>()
        .or_400("could not parse order number")?;

    let order = state
        .app
        .orders
        .get_order(user.uuid, number)
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use bookstore_app::domain::orders::{MockOrdersService, OrdersServiceError};
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{
        orders::handlers::tests::make_order,
        test_helpers::{TestServices, customer, customer_service},
    };

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        customer_service(
            TestServices {
                orders,
                ..TestServices::strict()
            },
            Router::with_path("orders/{number}").get(handler),
        )
    }

    #[tokio::test]
    async fn test_get_normalises_number_case() -> TestResult {
        let order = make_order(customer().uuid, "0A1B2C3D4E");

        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .withf(|user, number| *user == customer().uuid && number.as_str() == "0A1B2C3D4E")
            .return_once(move |_, _| Ok(order));

        let mut res = TestClient::get("http://example.com/orders/0a1b2c3d4e")
            .send(&make_service(orders))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.number, "0A1B2C3D4E");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_someone_elses_order_returns_404() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::NotFound));

        let res = TestClient::get("http://example.com/orders/FFFFFFFFFF")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_malformed_number_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_get_order().never();

        let res = TestClient::get("http://example.com/orders/not-an-order")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
