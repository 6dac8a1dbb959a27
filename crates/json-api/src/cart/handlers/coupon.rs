//! Apply Coupon Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{oapi::extract::JsonBody, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_app::domain::coupons::records::CouponRecord;

use crate::{cart::errors::coupon_status_error, extensions::*, state::State};

/// Apply Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyCouponRequest {
    pub code: String,
}

/// Applied Coupon Response
///
/// Pass `uuid` to checkout to have the discount taken off.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AppliedCouponResponse {
    pub uuid: Uuid,
    pub code: String,

    /// Percentage taken off the order total
    pub discount: u8,

    /// Last instant the coupon can be used
    pub expires_at: String,
}

impl From<CouponRecord> for AppliedCouponResponse {
    fn from(coupon: CouponRecord) -> Self {
        Self {
            uuid: coupon.uuid.into_uuid(),
            code: coupon.code,
            discount: coupon.discount,
            expires_at: coupon.expires_at.to_string(),
        }
    }
}

/// Apply Coupon Handler
///
/// Checks a coupon code is currently usable. Nothing is stored; the caller keeps the returned
/// UUID and sends it with checkout, where validity is checked again.
#[endpoint(
    tags("cart"),
    summary = "Apply Coupon",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Coupon is valid"),
        (status_code = StatusCode::NOT_FOUND, description = "Unknown coupon code"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Coupon inactive or outside its window"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ApplyCouponRequest>,
    depot: &mut Depot,
) -> Result<Json<AppliedCouponResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.current_user_or_401()?;

    let code = json.into_inner().code;

    let coupon = state
        .app
        .coupons
        .apply_coupon(code.trim(), Timestamp::now())
        .await
        .map_err(coupon_status_error)?;

    Ok(Json(coupon.into()))
}

#[cfg(test)]
mod tests {
    use bookstore_app::domain::coupons::{
        CouponsServiceError, MockCouponsService, records::CouponUuid,
    };
    use jiff::SignedDuration;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{TestServices, customer_service};

    use super::*;

    fn make_service(coupons: MockCouponsService) -> Service {
        customer_service(
            TestServices {
                coupons,
                ..TestServices::strict()
            },
            Router::with_path("cart/coupon").post(handler),
        )
    }

    fn make_coupon(code: &str) -> CouponRecord {
        let now = Timestamp::now();

        CouponRecord {
            uuid: CouponUuid::new(),
            code: code.to_string(),
            discount: 15,
            starts_at: now - SignedDuration::from_hours(1),
            expires_at: now + SignedDuration::from_hours(1),
            active: true,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_apply_valid_coupon() -> TestResult {
        let coupon = make_coupon("SPRING");
        let coupon_uuid = coupon.uuid;

        let mut coupons = MockCouponsService::new();

        coupons
            .expect_apply_coupon()
            .once()
            .withf(|code, _| code == "SPRING")
            .return_once(move |_, _| Ok(coupon));

        let mut res = TestClient::post("http://example.com/cart/coupon")
            .json(&json!({ "code": " SPRING " }))
            .send(&make_service(coupons))
            .await;

        let body: AppliedCouponResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, coupon_uuid.into_uuid());
        assert_eq!(body.discount, 15);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_code_returns_404() -> TestResult {
        let mut coupons = MockCouponsService::new();

        coupons.expect_apply_coupon().once().return_once(|code, _| {
            Err(CouponsServiceError::InvalidCoupon {
                code: code.to_string(),
            })
        });

        let res = TestClient::post("http://example.com/cart/coupon")
            .json(&json!({ "code": "NOPE" }))
            .send(&make_service(coupons))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_expired_code_returns_422() -> TestResult {
        let mut coupons = MockCouponsService::new();

        coupons.expect_apply_coupon().once().return_once(|code, _| {
            Err(CouponsServiceError::CouponExpired {
                code: code.to_string(),
            })
        });

        let res = TestClient::post("http://example.com/cart/coupon")
            .json(&json!({ "code": "WINTER" }))
            .send(&make_service(coupons))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }
}
