//! Coupons service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::coupons::{
        data::NewCoupon,
        errors::CouponsServiceError,
        records::CouponRecord,
        repository::PgCouponsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    repository: PgCouponsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCouponsRepository::new(),
        }
    }
}

#[async_trait]
impl CouponsService for PgCouponsService {
    #[tracing::instrument(
        name = "coupons.service.apply_coupon",
        skip(self, now),
        fields(coupon_uuid = tracing::field::Empty),
        err
    )]
    async fn apply_coupon(
        &self,
        code: &str,
        now: Timestamp,
    ) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let coupon = self.repository.find_coupon_by_code(&mut tx, code).await?;

        tx.commit().await?;

        let Some(coupon) = coupon else {
            return Err(CouponsServiceError::InvalidCoupon {
                code: code.to_string(),
            });
        };

        tracing::Span::current().record("coupon_uuid", tracing::field::display(coupon.uuid));

        if !coupon.is_valid_at(now) {
            return Err(CouponsServiceError::CouponExpired { code: coupon.code });
        }

        debug!(discount = coupon.discount, "coupon applied");

        Ok(coupon)
    }

    #[tracing::instrument(
        name = "coupons.service.create_coupon",
        skip(self, coupon),
        fields(coupon_uuid = %coupon.uuid, code = %coupon.code),
        err
    )]
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError> {
        if coupon.discount > 100 || coupon.starts_at > coupon.expires_at {
            return Err(CouponsServiceError::InvalidData);
        }

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_coupon(&mut tx, coupon).await?;

        tx.commit().await?;

        info!(coupon_uuid = %created.uuid, "created coupon");

        Ok(created)
    }
}

#[automock]
#[async_trait]
/// Coupon lookup and validation.
pub trait CouponsService: Send + Sync {
    /// Look up a coupon by code and check it is usable at `now`.
    ///
    /// Unknown codes fail with `InvalidCoupon`; known coupons that are inactive or outside
    /// their window fail with `CouponExpired`. The returned coupon's UUID is what callers
    /// pass to checkout.
    async fn apply_coupon(
        &self,
        code: &str,
        now: Timestamp,
    ) -> Result<CouponRecord, CouponsServiceError>;

    /// Creates a new coupon.
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError>;
}
