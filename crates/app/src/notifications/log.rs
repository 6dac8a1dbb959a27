//! Notifier that only logs.

use async_trait::async_trait;
use tracing::info;

use super::{NotificationError, Notifier};

/// Stands in for real delivery when no mail server is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient: &str, body: &str) -> Result<(), NotificationError> {
        info!(recipient, body, "notification not sent: no mail transport configured");

        Ok(())
    }
}
