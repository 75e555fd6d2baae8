use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slug::slugify;
use super::tag::Tag;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown post status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for PostStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Post entity - a blog article as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub author_id: Uuid,
    pub body: String,
    pub publish: DateTime<Utc>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub status: PostStatus,
    pub tags: Vec<Tag>,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Day the slug must be unique within.
    pub fn publish_date(&self) -> NaiveDate {
        self.publish.date_naive()
    }

    /// Overwrite the slug from the current title.
    pub fn assign_slug(&mut self) {
        self.slug = slugify(&self.title);
    }

    pub fn tag_ids(&self) -> Vec<i64> {
        self.tags.iter().map(|t| t.id).collect()
    }
}

/// A post that has not been persisted yet.
///
/// `slug` may be filled in by the caller but is always replaced on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    #[serde(default)]
    pub slug: String,
    pub author_id: Uuid,
    pub body: String,
    pub publish: DateTime<Utc>,
    pub status: PostStatus,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewPost {
    /// Draft post publishing now.
    pub fn new(author_id: Uuid, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: String::new(),
            author_id,
            body: body.into(),
            publish: Utc::now(),
            status: PostStatus::Draft,
            tags: Vec::new(),
        }
    }

    pub fn published(mut self) -> Self {
        self.status = PostStatus::Published;
        self
    }

    pub fn publish_at(mut self, publish: DateTime<Utc>) -> Self {
        self.publish = publish;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn assign_slug(&mut self) {
        self.slug = slugify(&self.title);
    }

    pub fn publish_date(&self) -> NaiveDate {
        self.publish.date_naive()
    }
}

/// A published post with its search relevance.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPost {
    pub post: Post,
    pub rank: f32,
}
