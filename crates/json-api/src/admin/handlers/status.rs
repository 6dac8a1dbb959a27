//! Update Order Status Handler

use std::sync::Arc;

use bookstore_app::domain::orders::records::{OrderStatus, OrderUuid};
use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{OrderResponse, errors::into_status_error},
    state::State,
};

/// Update Order Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateOrderStatusRequest {
    /// One of `pending`, `paid`, `shipped`, `delivered` or `cancelled`
    pub status: String,
}

/// Update Order Status Handler
///
/// Any status may follow any other.
#[endpoint(
    tags("admin"),
    summary = "Update Order Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Status updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateOrderStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let status = json
        .into_inner()
        .status
        .parse::<OrderStatus>()
        .or_400("could not parse order status")?;

    let updated = state
        .app
        .orders
        .update_status(OrderUuid::from_uuid(order.into_inner()), status)
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}

#[cfg(test)]
mod tests {
    use bookstore_app::domain::orders::{MockOrdersService, OrdersServiceError};
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        orders::handlers::tests::make_order,
        test_helpers::{TestServices, admin, customer, service_as},
    };

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        service_as(
            admin(),
            TestServices {
                orders,
                ..TestServices::strict()
            },
            Router::with_path("admin/orders/{order}/status").put(handler),
        )
    }

    #[tokio::test]
    async fn test_update_status() -> TestResult {
        let mut order = make_order(customer().uuid, "0A1B2C3D4E");
        let order_uuid = order.uuid;

        order.status = OrderStatus::Shipped;

        let mut orders = MockOrdersService::new();

        orders
            .expect_update_status()
            .once()
            .withf(move |uuid, status| *uuid == order_uuid && *status == OrderStatus::Shipped)
            .return_once(move |_, _| Ok(order));

        let mut res = TestClient::put(format!("http://example.com/admin/orders/{order_uuid}/status"))
            .json(&json!({ "status": "shipped" }))
            .send(&make_service(orders))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.status, "shipped");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_status_returns_400() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_update_status().never();

        let res = TestClient::put(format!(
            "http://example.com/admin/orders/{}/status",
            Uuid::now_v7()
        ))
        .json(&json!({ "status": "lost" }))
        .send(&make_service(orders))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_order_returns_404() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_update_status()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::NotFound));

        let res = TestClient::put(format!(
            "http://example.com/admin/orders/{}/status",
            Uuid::now_v7()
        ))
        .json(&json!({ "status": "paid" }))
        .send(&make_service(orders))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
