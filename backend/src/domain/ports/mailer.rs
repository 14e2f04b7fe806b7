//! Port abstraction for transactional email delivery.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::domain::EmailAddress;

/// Errors raised by mailer adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailerError {
    /// The transport is misconfigured (bad addresses, TLS setup, etc.).
    #[error("mailer configuration invalid: {message}")]
    Configuration { message: String },

    /// The message could not be handed to the transport.
    #[error("mail delivery failed: {message}")]
    Delivery { message: String },
}

impl MailerError {
    /// Create a configuration error with the given message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a delivery error with the given message.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }
}

/// Notifier port for plain-text transactional messages.
///
/// Delivery is synchronous within the triggering request; there is no retry
/// or queueing, and failures propagate to the caller.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a message to a single recipient.
    async fn send(
        &self,
        recipient: &EmailAddress,
        subject: &str,
        body: &str,
    ) -> Result<(), MailerError>;
}

/// A message captured by [`RecordingMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMail {
    /// Recipient address.
    pub recipient: EmailAddress,
    /// Message subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Mailer that records messages instead of delivering them.
///
/// Used by tests (to assert on confirmation/reset links) and by development
/// runs without SMTP settings, where each message is logged instead of sent.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<RecordedMail>>,
}

impl RecordingMailer {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every message recorded so far.
    pub fn sent(&self) -> Vec<RecordedMail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// The most recently recorded message, if any.
    pub fn last(&self) -> Option<RecordedMail> {
        self.sent
            .lock()
            .ok()
            .and_then(|sent| sent.last().cloned())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        recipient: &EmailAddress,
        subject: &str,
        body: &str,
    ) -> Result<(), MailerError> {
        info!(recipient = %recipient, subject, "recording outbound mail instead of sending");
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| MailerError::delivery("mail recorder lock poisoned"))?;
        sent.push(RecordedMail {
            recipient: recipient.clone(),
            subject: subject.to_owned(),
            body: body.to_owned(),
        });
        Ok(())
    }
}
