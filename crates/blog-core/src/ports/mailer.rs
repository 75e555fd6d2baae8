//! Outbound mail port.

use async_trait::async_trait;

/// Mail transport - abstraction over SMTP or a test double.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a plain-text message to a single recipient.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Mail dispatch errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Transport failure: {0}")]
    Transport(String),
}
