//! Mail transports implementing the `Mailer` port.
//!
//! - [`LogMailer`] - logs instead of sending (no SMTP configured)
//! - [`RecordingMailer`] - keeps sent messages in memory (tests)
//! - [`SmtpMailer`] - lettre SMTP transport (`smtp` feature)

mod memory;

#[cfg(feature = "smtp")]
mod smtp;

pub use memory::{LogMailer, RecordingMailer, SentEmail};

#[cfg(feature = "smtp")]
pub use smtp::SmtpMailer;

/// SMTP settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Empty host means mail is only logged.
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub use_starttls: bool,
    pub from: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            use_starttls: true,
            from: "Blog <admin_blog@blog.local>".to_string(),
        }
    }
}

impl MailConfig {
    pub fn is_configured(&self) -> bool {
        !self.smtp_host.trim().is_empty()
    }
}
