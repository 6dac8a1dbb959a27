//! Order Handlers

pub(crate) mod get;
pub(crate) mod index;

use bookstore_app::domain::orders::records::{OrderLineRecord, OrderRecord};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,

    /// Customer-facing reference, ten uppercase hexadecimal characters
    pub number: String,

    /// One of `pending`, `paid`, `shipped`, `delivered` or `cancelled`
    pub status: String,

    /// The coupon that discounted this order, if any
    pub coupon_uuid: Option<Uuid>,

    /// Amount charged, rounded to cents
    pub total: String,

    pub shipping_address: String,
    pub lines: Vec<OrderLineResponse>,

    /// The date and time the order was placed
    pub created_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            uuid: order.uuid.into_uuid(),
            number: order.number.into_string(),
            status: order.status.to_string(),
            coupon_uuid: order.coupon_uuid.map(|coupon| coupon.into_uuid()),
            total: order.total.to_string(),
            shipping_address: order.shipping_address,
            lines: order.lines.into_iter().map(OrderLineResponse::from).collect(),
            created_at: order.created_at.to_string(),
        }
    }
}

/// Order Line Response
///
/// The title and price the book had when it was sold.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderLineResponse {
    pub book_uuid: Uuid,
    pub title: String,
    pub quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
}

impl From<OrderLineRecord> for OrderLineResponse {
    fn from(line: OrderLineRecord) -> Self {
        Self {
            book_uuid: line.book_uuid.into_uuid(),
            subtotal: line.subtotal().to_string(),
            unit_price: line.unit_price.to_string(),
            title: line.title,
            quantity: line.quantity,
        }
    }
}
