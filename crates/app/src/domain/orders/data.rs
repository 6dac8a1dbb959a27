//! Order Data

use crate::domain::coupons::records::CouponUuid;

/// Checkout request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceOrder {
    pub shipping_address: String,

    /// Coupon previously returned by `apply_coupon`. It is checked again at checkout.
    pub coupon: Option<CouponUuid>,
}
