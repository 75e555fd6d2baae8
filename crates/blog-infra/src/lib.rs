//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory store and log-only mail
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `smtp` - SMTP mail delivery via lettre

pub mod database;
pub mod mail;
pub mod memory;

// Re-exports - In-Memory
pub use mail::{LogMailer, MailConfig, RecordingMailer};
pub use memory::InMemoryBlogStore;

// Re-exports - External services
#[cfg(feature = "postgres")]
pub use database::{PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository};
#[cfg(feature = "smtp")]
pub use mail::SmtpMailer;
