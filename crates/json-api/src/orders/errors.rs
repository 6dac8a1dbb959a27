//! Errors

use salvo::http::StatusError;
use tracing::error;

use bookstore_app::domain::orders::OrdersServiceError;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::EmptyCart => {
            StatusError::unprocessable_entity().brief("Cannot check out an empty cart")
        }
        error @ OrdersServiceError::InsufficientStock { .. } => {
            StatusError::conflict().brief(error.to_string())
        }
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::AlreadyExists => StatusError::conflict().brief("Order already exists"),
        OrdersServiceError::InvalidReference
        | OrdersServiceError::MissingRequiredData
        | OrdersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid order data")
        }
        OrdersServiceError::OrderNumberExhausted => {
            error!("ran out of order number attempts");

            StatusError::internal_server_error()
        }
        OrdersServiceError::Sql(source) => {
            error!("failed to process order: {source}");

            StatusError::internal_server_error()
        }
    }
}
