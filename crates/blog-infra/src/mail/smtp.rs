//! SMTP mail transport using lettre.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{Mailbox, Message, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use blog_core::ports::{MailError, Mailer};

use super::MailConfig;

/// Async SMTP mailer. Without a configured host it only logs.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| MailError::InvalidAddress(format!("MAIL_FROM: {}", e)))?;

        let transport = if config.is_configured() {
            let builder = if config.use_starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            }
            .map_err(|e| MailError::Transport(format!("Failed to configure SMTP: {}", e)))?
            .port(config.smtp_port);

            let builder = match (&config.smtp_username, &config.smtp_password) {
                (Some(username), Some(password)) => {
                    builder.credentials(Credentials::new(username.clone(), password.clone()))
                }
                _ => builder,
            };

            tracing::info!(host = %config.smtp_host, port = config.smtp_port, "SMTP transport configured");
            Some(Arc::new(builder.build()))
        } else {
            tracing::warn!("SMTP host not configured; mail will only be logged");
            None
        };

        Ok(Self { transport, from })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let Some(transport) = &self.transport else {
            tracing::info!(subject, recipient = to, "SMTP disabled; skipping actual send");
            return Ok(());
        };

        let to = to
            .parse::<Mailbox>()
            .map_err(|e| MailError::InvalidAddress(e.to_string()))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;

        transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::info!(subject, "Email sent");
        Ok(())
    }
}
