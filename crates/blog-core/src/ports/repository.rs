use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Comment, NewComment, NewPost, Post, RankedPost, Tag};
use crate::error::RepoError;

/// Post storage.
///
/// Two query scopes exist over the same table: the unfiltered one
/// (`find_by_id`, `list_all`) and the published-only one (every method with
/// `published` in its name). Listings are ordered by `publish` descending and
/// returned posts carry their tags.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find any post, whatever its status.
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError>;

    /// Find a post only if it is published.
    async fn find_published_by_id(&self, id: i64) -> Result<Option<Post>, RepoError>;

    /// Every post, drafts included.
    async fn list_all(&self) -> Result<Vec<Post>, RepoError>;

    /// At most `limit` published posts after skipping `offset`, optionally
    /// restricted to one tag.
    async fn list_published(
        &self,
        tag_id: Option<i64>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;

    /// Number of published posts, optionally restricted to one tag.
    async fn count_published(&self, tag_id: Option<i64>) -> Result<u64, RepoError>;

    /// Published posts sharing at least one tag with `post`, excluding it,
    /// ordered by shared-tag count then publish date, both descending.
    async fn similar_published(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Published posts whose weighted title/body rank against `query` is at
    /// least `threshold`, best first.
    async fn search_published(
        &self,
        query: &str,
        threshold: f32,
    ) -> Result<Vec<RankedPost>, RepoError>;

    /// Whether another post already uses `slug` on `date`.
    async fn slug_taken(
        &self,
        slug: &str,
        date: NaiveDate,
        exclude_id: Option<i64>,
    ) -> Result<bool, RepoError>;

    /// Persist a new post and link it to the tags named in `post.tags`,
    /// as one unit: either both are stored or neither is.
    async fn insert(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Persist changes to an existing post and replace its tags with
    /// `tag_names`, as one unit.
    async fn update(&self, post: Post, tag_names: &[String]) -> Result<Post, RepoError>;

    /// Delete a post together with its comments and tag links.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}

/// Comment storage.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Active comments of a post, newest first.
    async fn list_active_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError>;
}

/// Tag vocabulary.
///
/// Tags are created on first use by the post write path. A submitted name
/// resolves to the existing tag with the same slug (see `TagName::resolve`).
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;
}
