//! Notification errors.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("invalid mail address")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message")]
    Message(#[from] lettre::error::Error),

    #[error("mail transport failed")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("mail delivery timed out after {0:?}")]
    Timeout(Duration),
}
