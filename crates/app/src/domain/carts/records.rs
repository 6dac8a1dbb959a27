//! Cart Records

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{
    domain::{books::records::BookUuid, coupons::records::CouponRecord, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// Cart Record
#[derive(Debug, Clone)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub user_uuid: UserUuid,

    /// Items in the order they were first added.
    pub items: Vec<CartItemRecord>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartRecord {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of every item at the book's current price.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItemRecord::subtotal).sum()
    }

    /// [`Self::total`] with the coupon's discount taken off, if the coupon is valid at `now`.
    #[must_use]
    pub fn total_with_coupon(&self, coupon: &CouponRecord, now: Timestamp) -> Decimal {
        let total = self.total();

        if coupon.is_valid_at(now) {
            coupon.discounted(total)
        } else {
            total
        }
    }
}

/// Cart Item Record
///
/// Title, price and stock are read from the book each time the cart is loaded, so they always
/// reflect the live catalog rather than the moment the item was added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub book_uuid: BookUuid,
    pub title: String,
    pub unit_price: Decimal,
    pub stock: u32,
    pub quantity: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartItemRecord {
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Outcome of setting an item's quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityUpdate {
    Updated(CartItemRecord),

    /// A quantity of zero or less removes the item.
    Removed,
}
