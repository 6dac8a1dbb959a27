//! Checkout Preview Handler

use std::sync::Arc;

use bookstore_app::domain::coupons::records::CouponUuid;
use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    cart::{CartResponse, handlers::coupon::AppliedCouponResponse},
    extensions::*,
    orders::errors::into_status_error,
    state::State,
};

/// Checkout Preview Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutPreviewResponse {
    pub cart: CartResponse,

    /// The coupon that would be applied, if it is still valid
    pub coupon: Option<AppliedCouponResponse>,

    /// What checkout would charge right now, rounded to cents
    pub total: String,

    pub warnings: Vec<String>,
}

/// Checkout Preview Handler
///
/// Prices the caller's cart with an optional coupon. Nothing is reserved, so the real checkout
/// may still fail on stock.
#[endpoint(
    tags("checkout"),
    summary = "Preview Checkout",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    coupon: QueryParam<Uuid, false>,
    depot: &mut Depot,
) -> Result<Json<CheckoutPreviewResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;

    let preview = state
        .app
        .orders
        .preview_checkout(
            user.uuid,
            coupon.into_inner().map(CouponUuid::from_uuid),
            Timestamp::now(),
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(CheckoutPreviewResponse {
        cart: preview.cart.into(),
        coupon: preview.coupon.map(Into::into),
        total: preview.total.to_string(),
        warnings: preview.warnings.iter().map(ToString::to_string).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use bookstore_app::domain::{
        carts::records::CartItemUuid,
        orders::{
            MockOrdersService,
            checkout::{CheckoutPreview, CheckoutWarning},
        },
    };
    use rust_decimal::Decimal;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{
        cart::handlers::tests::{make_cart, make_item},
        test_helpers::{TestServices, customer, customer_service},
    };

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        customer_service(
            TestServices {
                orders,
                ..TestServices::strict()
            },
            Router::with_path("checkout").get(handler),
        )
    }

    #[tokio::test]
    async fn test_preview_without_coupon() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_preview_checkout()
            .once()
            .withf(|user, coupon, _| *user == customer().uuid && coupon.is_none())
            .return_once(|_, _, _| {
                Ok(CheckoutPreview {
                    cart: make_cart(vec![make_item(CartItemUuid::new(), 2)]),
                    coupon: None,
                    total: Decimal::new(51_98, 2),
                    warnings: Vec::new(),
                })
            });

        let mut res = TestClient::get("http://example.com/checkout")
            .send(&make_service(orders))
            .await;

        let body: CheckoutPreviewResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.total, "51.98");
        assert!(body.coupon.is_none());
        assert!(body.warnings.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_preview_reports_dropped_coupon() -> TestResult {
        let coupon = CouponUuid::new();

        let mut orders = MockOrdersService::new();

        orders
            .expect_preview_checkout()
            .once()
            .withf(move |_, requested, _| *requested == Some(coupon))
            .return_once(move |_, _, _| {
                Ok(CheckoutPreview {
                    cart: make_cart(vec![make_item(CartItemUuid::new(), 1)]),
                    coupon: None,
                    total: Decimal::new(25_99, 2),
                    warnings: vec![CheckoutWarning::CouponDropped {
                        coupon_uuid: coupon,
                        code: Some("WINTER".to_string()),
                    }],
                })
            });

        let mut res = TestClient::get(format!("http://example.com/checkout?coupon={coupon}"))
            .send(&make_service(orders))
            .await;

        let body: CheckoutPreviewResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.total, "25.99");
        assert_eq!(body.warnings.len(), 1);
        assert!(body.warnings.iter().any(|w| w.contains("WINTER")));

        Ok(())
    }
}
