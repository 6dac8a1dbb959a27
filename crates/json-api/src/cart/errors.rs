//! Errors

use salvo::http::StatusError;
use tracing::error;

use bookstore_app::domain::{carts::CartsServiceError, coupons::CouponsServiceError};

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::Stock(stock) => StatusError::conflict().brief(stock.to_string()),
        CartsServiceError::InvalidQuantity => {
            StatusError::unprocessable_entity().brief("Quantity must be at least one")
        }
        CartsServiceError::BookNotFound => StatusError::not_found().brief("Book not found"),
        CartsServiceError::NotFound => StatusError::not_found().brief("Cart item not found"),
        CartsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Cart item already exists")
        }
        CartsServiceError::InvalidReference
        | CartsServiceError::MissingRequiredData
        | CartsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid cart payload")
        }
        CartsServiceError::Sql(source) => {
            error!("failed to update cart: {source}");

            StatusError::internal_server_error()
        }
    }
}

pub(crate) fn coupon_status_error(error: CouponsServiceError) -> StatusError {
    match error {
        error @ CouponsServiceError::InvalidCoupon { .. } => {
            StatusError::not_found().brief(error.to_string())
        }
        error @ CouponsServiceError::CouponExpired { .. } => {
            StatusError::unprocessable_entity().brief(error.to_string())
        }
        CouponsServiceError::NotFound => StatusError::not_found().brief("Coupon not found"),
        CouponsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Coupon already exists")
        }
        CouponsServiceError::MissingRequiredData | CouponsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid coupon payload")
        }
        CouponsServiceError::Sql(source) => {
            error!("failed to look up coupon: {source}");

            StatusError::internal_server_error()
        }
    }
}
