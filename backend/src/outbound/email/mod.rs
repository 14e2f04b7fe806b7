//! SMTP mailer adapter built on `lettre`.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::EmailAddress;
use crate::domain::ports::{Mailer, MailerError};

/// SMTP connection and sender-identity settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// Relay host name.
    pub host: String,
    /// Relay port; 465 selects implicit TLS, other ports use STARTTLS.
    pub port: u16,
    /// Optional authentication user.
    pub username: Option<String>,
    /// Optional authentication password.
    pub password: Option<String>,
    /// Disable to talk plaintext SMTP (local development relays only).
    pub use_tls: bool,
    /// `From` address for outbound messages.
    pub from_address: String,
    /// Optional display name for the `From` header.
    pub from_name: Option<String>,
}

/// SMTP adapter for the mailer port.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    /// Build a transport from the given settings.
    pub fn new(settings: SmtpSettings) -> Result<Self, MailerError> {
        let SmtpSettings {
            host,
            port,
            username,
            password,
            use_tls,
            from_address,
            from_name,
        } = settings;

        let mut builder = if use_tls {
            let tls_params = TlsParameters::new(host.clone())
                .map_err(|err| MailerError::configuration(format!("TLS setup failed: {err}")))?;

            // Port 465 uses implicit TLS (SMTPS), other ports use STARTTLS.
            if port == 465 {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
                    .map_err(|err| {
                        MailerError::configuration(format!("SMTP relay setup failed: {err}"))
                    })?
                    .port(port)
                    .tls(Tls::Wrapper(tls_params))
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
                    .map_err(|err| {
                        MailerError::configuration(format!("SMTP relay setup failed: {err}"))
                    })?
                    .port(port)
                    .tls(Tls::Required(tls_params))
            }
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&host).port(port)
        };

        if let (Some(user), Some(pass)) = (username, password) {
            builder = builder.credentials(Credentials::new(user, pass));
        }

        let from = match from_name {
            Some(name) => format!("{name} <{from_address}>"),
            None => from_address,
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        recipient: &EmailAddress,
        subject: &str,
        body: &str,
    ) -> Result<(), MailerError> {
        let message = Message::builder()
            .from(self.from.parse().map_err(|err| {
                MailerError::configuration(format!("invalid from address: {err}"))
            })?)
            .to(recipient.as_ref().parse().map_err(|err| {
                MailerError::configuration(format!("invalid recipient address: {err}"))
            })?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_owned())
            .map_err(|err| MailerError::delivery(format!("failed to build message: {err}")))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|err| MailerError::delivery(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    fn settings(port: u16, use_tls: bool) -> SmtpSettings {
        SmtpSettings {
            host: "localhost".to_owned(),
            port,
            username: None,
            password: None,
            use_tls,
            from_address: "forum@example.com".to_owned(),
            from_name: Some("Forum".to_owned()),
        }
    }

    #[tokio::test]
    async fn builds_plaintext_transport_for_dev_relays() {
        assert!(SmtpMailer::new(settings(25, false)).is_ok());
    }

    #[tokio::test]
    async fn builds_starttls_transport_on_submission_port() {
        assert!(SmtpMailer::new(settings(587, true)).is_ok());
    }

    #[tokio::test]
    async fn builds_implicit_tls_transport_on_465() {
        assert!(SmtpMailer::new(settings(465, true)).is_ok());
    }

    #[tokio::test]
    async fn formats_the_from_header_with_display_name() {
        let mailer = SmtpMailer::new(settings(25, false)).expect("build mailer");
        assert_eq!(mailer.from, "Forum <forum@example.com>");
    }
}
