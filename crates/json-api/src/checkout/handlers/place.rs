//! Place Order Handler

use std::sync::Arc;

use bookstore_app::domain::{coupons::records::CouponUuid, orders::data::PlaceOrder};
use jiff::Timestamp;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{OrderResponse, errors::into_status_error},
    state::State,
};

/// Checkout Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutRequest {
    pub shipping_address: String,

    /// UUID returned by applying a coupon to the cart
    #[serde(default)]
    pub coupon: Option<Uuid>,
}

/// Checkout Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutResponse {
    pub order: OrderResponse,

    /// Non-fatal problems, such as a coupon that was no longer valid
    pub warnings: Vec<String>,

    /// Whether the submitted coupon has been used and should be forgotten
    pub coupon_cleared: bool,

    /// Whether the order confirmation was delivered
    pub notification_sent: bool,
}

/// Place Order Handler
///
/// Turns the caller's cart into an order. Either every line is taken from stock and the cart
/// emptied, or nothing changes.
#[endpoint(
    tags("checkout"),
    summary = "Place Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing shipping address"),
        (status_code = StatusCode::CONFLICT, description = "Not enough stock for a line"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Cart is empty"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CheckoutRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CheckoutResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;

    let request = json.into_inner();
    let shipping_address = request.shipping_address.trim();

    if shipping_address.is_empty() {
        return Err(StatusError::bad_request().brief("Shipping address is required"));
    }

    let receipt = state
        .app
        .orders
        .checkout(
            user.uuid,
            PlaceOrder {
                shipping_address: shipping_address.to_string(),
                coupon: request.coupon.map(CouponUuid::from_uuid),
            },
            Timestamp::now(),
        )
        .await
        .map_err(into_status_error)?;

    info!(order_number = %receipt.order.number, "order placed");

    res.add_header(LOCATION, format!("/orders/{}", receipt.order.number), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(CheckoutResponse {
        warnings: receipt.warnings.iter().map(ToString::to_string).collect(),
        coupon_cleared: receipt.coupon_cleared,
        notification_sent: receipt.notification_sent,
        order: receipt.order.into(),
    }))
}
