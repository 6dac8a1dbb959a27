//! SMTP notifier.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    time::Duration,
};

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tokio::time;
use tracing::debug;

use super::{NotificationError, Notifier};

const SUBJECT: &str = "Order confirmation";

/// Connection details for an authenticated submission server.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,

    /// Sender address.
    pub from: String,

    /// When set, every message goes here instead of to the customer.
    pub recipient_override: Option<String>,

    /// Upper bound on a single delivery, connection included.
    pub timeout: Duration,
}

impl Debug for SmtpSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .field("recipient_override", &self.recipient_override)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Sends plain-text mail over SMTP with STARTTLS.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipient_override: Option<Mailbox>,
    timeout: Duration,
}

impl Debug for SmtpNotifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SmtpNotifier")
            .field("from", &self.from)
            .field("recipient_override", &self.recipient_override)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SmtpNotifier {
    /// Build a notifier. No connection is made until the first message is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if an address does not parse or the relay cannot be configured.
    pub fn new(settings: SmtpSettings) -> Result<Self, NotificationError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            .port(settings.port)
            .credentials(Credentials::new(settings.username, settings.password))
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self {
            transport,
            from: settings.from.parse()?,
            recipient_override: settings
                .recipient_override
                .as_deref()
                .map(str::parse::<Mailbox>)
                .transpose()?,
            timeout: settings.timeout,
        })
    }

    fn build_message(&self, recipient: &str, body: &str) -> Result<Message, NotificationError> {
        let to = match &self.recipient_override {
            Some(mailbox) => mailbox.clone(),
            None => recipient.parse()?,
        };

        Ok(Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, recipient: &str, body: &str) -> Result<(), NotificationError> {
        let message = self.build_message(recipient, body)?;

        // A relay that accepts the connection but never answers must not hold up checkout.
        let response = time::timeout(self.timeout, self.transport.send(message))
            .await
            .map_err(|_elapsed| NotificationError::Timeout(self.timeout))??;

        debug!(code = %response.code(), "notification sent");

        Ok(())
    }
}
