//! Blog use cases on top of the storage and mail ports.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{Comment, NewComment, NewPost, Post, RankedPost, ShareMessage, Tag};
use crate::error::{DomainError, RepoError};
use crate::forms::{CommentFields, ShareFields};
use crate::pagination::{Page, PageRequest, PageWindow};
use crate::ports::{CommentRepository, Mailer, PostRepository, TagRepository};
use crate::settings::BlogSettings;

/// Everything the detail page shows.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub similar_posts: Vec<Post>,
}

/// Listing of one tag's published posts.
#[derive(Debug, Clone)]
pub struct TaggedPage {
    pub tag: Tag,
    pub page: Page<Post>,
}

#[derive(Clone)]
pub struct BlogService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    tags: Arc<dyn TagRepository>,
    mailer: Arc<dyn Mailer>,
    settings: BlogSettings,
}

impl BlogService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        tags: Arc<dyn TagRepository>,
        mailer: Arc<dyn Mailer>,
        settings: BlogSettings,
    ) -> Self {
        Self {
            posts,
            comments,
            tags,
            mailer,
            settings,
        }
    }

    pub fn settings(&self) -> &BlogSettings {
        &self.settings
    }

    /// Published posts, newest first, one page at a time.
    pub async fn list_published(&self, request: PageRequest) -> Result<Page<Post>, DomainError> {
        self.published_page(None, request).await
    }

    /// Published posts carrying the tag identified by `tag_slug`.
    pub async fn list_published_by_tag(
        &self,
        tag_slug: &str,
        request: PageRequest,
    ) -> Result<TaggedPage, DomainError> {
        let tag = self
            .tags
            .find_by_slug(tag_slug)
            .await?
            .ok_or_else(|| DomainError::tag_not_found(tag_slug))?;

        let page = self.published_page(Some(tag.id), request).await?;
        Ok(TaggedPage { tag, page })
    }

    async fn published_page(
        &self,
        tag_id: Option<i64>,
        request: PageRequest,
    ) -> Result<Page<Post>, DomainError> {
        let count = self.posts.count_published(tag_id).await?;
        let window = PageWindow::resolve(request, count, self.settings.page_size)?;
        let items = self
            .posts
            .list_published(tag_id, window.offset, window.limit)
            .await?;
        Ok(Page::new(items, window))
    }

    /// Any post by id, drafts included.
    pub async fn post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    pub async fn post_detail(&self, id: i64) -> Result<PostDetail, DomainError> {
        let post = self.post(id).await?;
        let comments = self.comments.list_active_for_post(post.id).await?;
        let similar_posts = self.similar_posts(&post).await?;

        Ok(PostDetail {
            post,
            comments,
            similar_posts,
        })
    }

    pub async fn similar_posts(&self, post: &Post) -> Result<Vec<Post>, DomainError> {
        if post.tags.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .posts
            .similar_published(post, self.settings.similar_posts)
            .await?)
    }

    /// Attach a validated comment to `post`. New comments are active.
    pub async fn add_comment(
        &self,
        post: &Post,
        fields: CommentFields,
    ) -> Result<Comment, DomainError> {
        let comment = NewComment::new(post.id, fields.name, fields.email, fields.body);
        let comment = self.comments.insert(comment).await?;
        tracing::info!(post_id = post.id, comment_id = comment.id, "Comment added");
        Ok(comment)
    }

    /// A post that may be shared: it must exist and be published.
    pub async fn shareable_post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_published_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    /// Email a recommendation of `post`, linking to `post_url`.
    pub async fn share_post(
        &self,
        post: &Post,
        post_url: &str,
        fields: &ShareFields,
    ) -> Result<ShareMessage, DomainError> {
        let message = ShareMessage::compose(post, post_url, fields);
        self.mailer
            .send(&message.to, &message.subject, &message.body)
            .await?;
        tracing::info!(post_id = post.id, "Post shared by email");
        Ok(message)
    }

    /// Ranked full-text search over published posts.
    pub async fn search(&self, query: &str) -> Result<Vec<RankedPost>, DomainError> {
        let results = self
            .posts
            .search_published(query, self.settings.search_rank_threshold)
            .await?;
        tracing::debug!(query, hits = results.len(), "Search executed");
        Ok(results)
    }

    /// Latest published posts for the syndication feed.
    pub async fn latest_posts(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self
            .posts
            .list_published(None, 0, self.settings.feed_items)
            .await?)
    }

    /// Create a post. The slug is always derived from the title.
    pub async fn create_post(&self, mut post: NewPost) -> Result<Post, DomainError> {
        post.assign_slug();
        self.ensure_slug_free(&post.slug, post.publish_date(), None)
            .await?;

        let created = self.posts.insert(post).await?;

        tracing::info!(post_id = created.id, slug = %created.slug, "Post created");
        Ok(created)
    }

    /// Save changes to a post. The slug is re-derived from the title and the
    /// post's tag names are re-assigned.
    pub async fn update_post(&self, mut post: Post) -> Result<Post, DomainError> {
        post.assign_slug();
        post.updated = Utc::now();
        self.ensure_slug_free(&post.slug, post.publish_date(), Some(post.id))
            .await?;

        let tag_names: Vec<String> = post.tags.iter().map(|t| t.name.clone()).collect();
        let id = post.id;
        let saved = self
            .posts
            .update(post, &tag_names)
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::post_not_found(id),
                other => other.into(),
            })?;

        tracing::info!(post_id = saved.id, slug = %saved.slug, "Post updated");
        Ok(saved)
    }

    pub async fn delete_post(&self, id: i64) -> Result<(), DomainError> {
        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::post_not_found(id),
            other => other.into(),
        })?;
        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }

    async fn ensure_slug_free(
        &self,
        slug: &str,
        date: chrono::NaiveDate,
        exclude_id: Option<i64>,
    ) -> Result<(), DomainError> {
        if self.posts.slug_taken(slug, date, exclude_id).await? {
            return Err(DomainError::Duplicate(format!(
                "a post with slug '{slug}' is already published on {date}"
            )));
        }
        Ok(())
    }
}
