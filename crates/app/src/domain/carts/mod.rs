//! Carts

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repositories;
pub mod service;
pub mod stock;

pub use errors::CartsServiceError;
pub use service::*;
