//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use blog_core::BlogSettings;
use blog_infra::database::DatabaseConfig;
use blog_infra::mail::MailConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the blog on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub mail: MailConfig,
    pub blog: BlogSettings,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = non_empty("DATABASE_URL").map(|url| {
            let defaults = DatabaseConfig::new(url);
            DatabaseConfig {
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections),
                min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", defaults.min_connections),
                ..defaults
            }
        });

        let mail_defaults = MailConfig::default();
        let mail = MailConfig {
            smtp_host: non_empty("SMTP_HOST").unwrap_or_default(),
            smtp_port: parse_or(&lookup, "SMTP_PORT", mail_defaults.smtp_port),
            smtp_username: non_empty("SMTP_USERNAME"),
            smtp_password: non_empty("SMTP_PASSWORD"),
            use_starttls: lookup("SMTP_STARTTLS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(mail_defaults.use_starttls),
            from: non_empty("MAIL_FROM").unwrap_or(mail_defaults.from),
        };

        let blog_defaults = BlogSettings::default();
        let blog = BlogSettings {
            page_size: parse_or(&lookup, "BLOG_PAGE_SIZE", blog_defaults.page_size).max(1),
            search_rank_threshold: parse_or(
                &lookup,
                "BLOG_SEARCH_RANK_THRESHOLD",
                blog_defaults.search_rank_threshold,
            ),
            similar_posts: parse_or(&lookup, "BLOG_SIMILAR_POSTS", blog_defaults.similar_posts),
            feed_items: parse_or(&lookup, "BLOG_FEED_ITEMS", blog_defaults.feed_items),
            feed_title: non_empty("BLOG_FEED_TITLE").unwrap_or(blog_defaults.feed_title),
            feed_description: non_empty("BLOG_FEED_DESCRIPTION")
                .unwrap_or(blog_defaults.feed_description),
        };

        Self {
            host: non_empty("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080),
            database,
            mail,
            blog,
        }
    }
}

/// Parse `key`, keeping `default` when it is unset or malformed.
fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
