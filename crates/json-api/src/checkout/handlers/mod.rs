//! Checkout Handlers

pub(crate) mod place;
pub(crate) mod preview;
