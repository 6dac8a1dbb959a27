//! Notification Config

use std::time::Duration;

use bookstore_app::notifications::SmtpSettings;
use clap::Args;

/// SMTP submission settings. Without a host, confirmations are only logged.
#[derive(Debug, Args)]
pub struct NotificationConfig {
    /// SMTP relay host
    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    /// SMTP submission port
    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    /// SMTP username
    #[arg(long, env = "SMTP_USERNAME", default_value = "")]
    pub smtp_username: String,

    /// SMTP password
    #[arg(long, env = "SMTP_PASSWORD", default_value = "", hide_env_values = true)]
    pub smtp_password: String,

    /// Sender mailbox for order confirmations
    #[arg(long, env = "SMTP_FROM", default_value = "Bookstore <orders@bookstore.invalid>")]
    pub smtp_from: String,

    /// Deliver every confirmation to this address instead of the customer
    #[arg(long, env = "NOTIFY_RECIPIENT")]
    pub notify_recipient: Option<String>,

    /// Give up on a confirmation after this many seconds
    #[arg(long, env = "SMTP_TIMEOUT_SECS", default_value_t = 10)]
    pub smtp_timeout_secs: u64,
}

impl NotificationConfig {
    /// SMTP settings, or `None` when no relay host is configured.
    #[must_use]
    pub fn smtp_settings(&self) -> Option<SmtpSettings> {
        let host = self
            .smtp_host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())?;

        Some(SmtpSettings {
            host: host.to_string(),
            port: self.smtp_port,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
            from: self.smtp_from.clone(),
            recipient_override: self.notify_recipient.clone(),
            timeout: Duration::from_secs(self.smtp_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: Option<&str>) -> NotificationConfig {
        NotificationConfig {
            smtp_host: host.map(str::to_string),
            smtp_port: 2525,
            smtp_username: "mailer".to_string(),
            smtp_password: "secret".to_string(),
            smtp_from: "orders@example.com".to_string(),
            notify_recipient: Some("audit@example.com".to_string()),
            smtp_timeout_secs: 3,
        }
    }

    #[test]
    fn test_missing_or_blank_host_disables_smtp() {
        assert!(config(None).smtp_settings().is_none());
        assert!(config(Some("  ")).smtp_settings().is_none());
    }

    #[test]
    fn test_host_enables_smtp_with_all_settings() {
        let settings = config(Some("smtp.example.com")).smtp_settings();

        assert_eq!(
            settings.as_ref().map(|s| (s.host.as_str(), s.port)),
            Some(("smtp.example.com", 2525))
        );
        assert_eq!(
            settings.as_ref().map(|s| s.timeout),
            Some(Duration::from_secs(3))
        );
        assert_eq!(
            settings.and_then(|s| s.recipient_override),
            Some("audit@example.com".to_string())
        );
    }
}
