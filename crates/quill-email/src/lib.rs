// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP email transport.
//!
//! Implements [`EmailGateway`] over an authenticated SMTP relay via
//! lettre. Only plaintext operator-facing mail goes through here
//! (support request forwards); user-facing communication is SMS.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use quill_core::{EmailGateway, QuillError};

/// SMTP-backed email gateway.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Creates a mailer against an authenticated STARTTLS relay.
    pub fn new(
        host: &str,
        port: u16,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, QuillError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| QuillError::Email {
                message: format!("failed to configure SMTP relay `{host}`: {e}"),
                source: Some(Box::new(e)),
            })?
            .port(port);

        if let (Some(username), Some(password)) = (username, password) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }

    fn parse_mailbox(value: &str) -> Result<Mailbox, QuillError> {
        value.parse::<Mailbox>().map_err(|e| QuillError::Email {
            message: format!("invalid mailbox `{value}`: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[async_trait]
impl EmailGateway for SmtpMailer {
    async fn send(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), QuillError> {
        let message = Message::builder()
            .from(Self::parse_mailbox(from)?)
            .to(Self::parse_mailbox(to)?)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| QuillError::Email {
                message: format!("failed to build email: {e}"),
                source: Some(Box::new(e)),
            })?;

        self.transport
            .send(message)
            .await
            .map_err(|e| QuillError::Email {
                message: format!("SMTP delivery to `{to}` failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        debug!(to = %to, subject = %subject, "email delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailbox_parses_display_name_form() {
        let mailbox = SmtpMailer::parse_mailbox("+15551230001 <relay@quill.chat>").unwrap();
        assert_eq!(mailbox.email.to_string(), "relay@quill.chat");
        assert_eq!(mailbox.name.as_deref(), Some("+15551230001"));
    }

    #[test]
    fn mailbox_parses_bare_address() {
        let mailbox = SmtpMailer::parse_mailbox("support@quill.chat").unwrap();
        assert_eq!(mailbox.email.to_string(), "support@quill.chat");
    }

    #[test]
    fn invalid_mailbox_is_an_email_error() {
        let result = SmtpMailer::parse_mailbox("not a mailbox");
        assert!(matches!(result, Err(QuillError::Email { .. })));
    }

    #[test]
    fn mailer_builds_against_hostname() {
        let mailer = SmtpMailer::new(
            "smtp.example.com",
            587,
            Some("user".to_string()),
            Some("pass".to_string()),
        );
        assert!(mailer.is_ok());
    }
}
