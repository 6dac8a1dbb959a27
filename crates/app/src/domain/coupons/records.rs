//! Coupon Records

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::uuids::TypedUuid;

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponRecord>;

/// Coupon Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponRecord {
    pub uuid: CouponUuid,
    pub code: String,

    /// Percentage taken off the total, 0 to 100.
    pub discount: u8,

    pub starts_at: Timestamp,
    pub expires_at: Timestamp,
    pub active: bool,
    pub created_at: Timestamp,
}

impl CouponRecord {
    /// Whether the coupon can be used at `now`. Both ends of the window are inclusive.
    #[must_use]
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        self.active && self.starts_at <= now && now <= self.expires_at
    }

    /// `amount` with this coupon's percentage removed, without rounding.
    #[must_use]
    pub fn discounted(&self, amount: Decimal) -> Decimal {
        let keep = Decimal::ONE_HUNDRED - Decimal::from(self.discount.min(100));

        amount * keep / Decimal::ONE_HUNDRED
    }
}
