//! Coupon Data

use jiff::Timestamp;

use crate::domain::coupons::records::CouponUuid;

/// New Coupon Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub uuid: CouponUuid,
    pub code: String,
    pub discount: u8,
    pub starts_at: Timestamp,
    pub expires_at: Timestamp,
    pub active: bool,
}
