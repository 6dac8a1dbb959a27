//! Cart Handlers

pub(crate) mod coupon;
pub(crate) mod get;
pub(crate) mod items;

use bookstore_app::domain::carts::records::{CartItemRecord, CartRecord};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart
    pub uuid: Uuid,

    /// The items in the cart, oldest first
    pub items: Vec<CartItemResponse>,

    /// Sum of the item subtotals at current prices
    pub total: String,

    /// The date and time the cart was created
    pub created_at: String,

    /// The date and time the cart was last updated
    pub updated_at: String,
}

impl From<CartRecord> for CartResponse {
    fn from(cart: CartRecord) -> Self {
        Self {
            uuid: cart.uuid.into_uuid(),
            total: cart.total().to_string(),
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            created_at: cart.created_at.to_string(),
            updated_at: cart.updated_at.to_string(),
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    /// The unique identifier of the cart item
    pub uuid: Uuid,

    pub book_uuid: Uuid,
    pub title: String,

    /// Current unit price of the book
    pub unit_price: String,

    pub quantity: u32,

    /// `unit_price * quantity`
    pub subtotal: String,

    /// Copies of the book currently in stock
    pub stock: u32,
}

impl From<CartItemRecord> for CartItemResponse {
    fn from(item: CartItemRecord) -> Self {
        Self {
            uuid: item.uuid.into_uuid(),
            book_uuid: item.book_uuid.into_uuid(),
            subtotal: item.subtotal().to_string(),
            unit_price: item.unit_price.to_string(),
            title: item.title,
            quantity: item.quantity,
            stock: item.stock,
        }
    }
}
