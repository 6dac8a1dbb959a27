//! Order confirmation delivery.

use async_trait::async_trait;
use mockall::automock;

mod errors;
mod log;
mod smtp;

pub use errors::NotificationError;
pub use log::LogNotifier;
pub use smtp::{SmtpNotifier, SmtpSettings};

#[automock]
#[async_trait]
/// Sends a plain-text message to a recipient.
///
/// Callers treat delivery as best effort: an error is reported, never retried.
pub trait Notifier: Send + Sync {
    /// Deliver `body` to `recipient`.
    async fn notify(&self, recipient: &str, body: &str) -> Result<(), NotificationError>;
}
