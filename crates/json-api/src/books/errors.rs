//! Errors

use salvo::http::StatusError;
use tracing::error;

use bookstore_app::domain::books::BooksServiceError;

pub(crate) fn into_status_error(error: BooksServiceError) -> StatusError {
    match error {
        BooksServiceError::NotFound => StatusError::not_found().brief("Book not found"),
        BooksServiceError::AlreadyExists => StatusError::conflict().brief("Book already exists"),
        BooksServiceError::InvalidReference
        | BooksServiceError::MissingRequiredData
        | BooksServiceError::InvalidData
        | BooksServiceError::InvalidStock(_) => {
            StatusError::bad_request().brief("Invalid book data")
        }
        BooksServiceError::Sql(source) => {
            error!("failed to load books: {source}");

            StatusError::internal_server_error()
        }
    }
}
