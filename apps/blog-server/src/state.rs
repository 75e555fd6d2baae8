//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::BlogService;
use blog_core::ports::{CommentRepository, Mailer, PostRepository, TagRepository};
use blog_infra::mail::{LogMailer, MailConfig};
use blog_infra::memory::InMemoryBlogStore;

#[cfg(feature = "postgres")]
use blog_infra::database::{
    self, PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
};
#[cfg(feature = "smtp")]
use blog_infra::mail::SmtpMailer;

use crate::config::AppConfig;

/// Which store backs the blog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Postgres => "postgres",
            StoreKind::Memory => "memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: BlogService,
    pub store: StoreKind,
}

struct Repositories {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    tags: Arc<dyn TagRepository>,
    kind: StoreKind,
}

impl Repositories {
    fn in_memory() -> Self {
        let store = Arc::new(InMemoryBlogStore::new());
        Self {
            posts: store.clone(),
            comments: store.clone(),
            tags: store,
            kind: StoreKind::Memory,
        }
    }
}

impl AppState {
    pub fn new(blog: BlogService, store: StoreKind) -> Self {
        Self { blog, store }
    }

    /// Build the application state with appropriate implementations.
    pub async fn from_config(config: &AppConfig) -> Self {
        let repos = open_store(config).await;
        let mailer = build_mailer(&config.mail);

        let blog = BlogService::new(
            repos.posts,
            repos.comments,
            repos.tags,
            mailer,
            config.blog.clone(),
        );

        tracing::info!(store = repos.kind.as_str(), "Application state initialized");
        Self::new(blog, repos.kind)
    }
}

#[cfg(feature = "postgres")]
async fn open_store(config: &AppConfig) -> Repositories {
    let Some(db_config) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return Repositories::in_memory();
    };

    match database::connect(db_config).await {
        Ok(conn) => Repositories {
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn.clone())),
            tags: Arc::new(PostgresTagRepository::new(conn)),
            kind: StoreKind::Postgres,
        },
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            Repositories::in_memory()
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn open_store(config: &AppConfig) -> Repositories {
    if config.database.is_some() {
        tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
    }
    tracing::info!("Running without postgres feature - using in-memory store");
    Repositories::in_memory()
}

#[cfg(feature = "smtp")]
fn build_mailer(config: &MailConfig) -> Arc<dyn Mailer> {
    match SmtpMailer::new(config) {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            tracing::error!(error = %e, "Invalid mail configuration; mail will only be logged");
            Arc::new(LogMailer)
        }
    }
}

#[cfg(not(feature = "smtp"))]
fn build_mailer(config: &MailConfig) -> Arc<dyn Mailer> {
    if config.is_configured() {
        tracing::warn!("SMTP_HOST ignored: built without the smtp feature");
    }
    Arc::new(LogMailer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn falls_back_to_memory_without_database() {
        let config = AppConfig::from_lookup(|_| None);

        let state = AppState::from_config(&config).await;

        assert_eq!(state.store, StoreKind::Memory);
        assert_eq!(state.blog.settings(), &config.blog);
    }
}
