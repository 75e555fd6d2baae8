//! Page contexts - the JSON documents each blog page renders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use blog_core::domain::{Comment, Post, PostStatus, RankedPost, Tag};
use blog_core::forms::{CommentForm, FieldErrors, SearchForm, ShareForm};
use blog_core::pagination::{Page, PageWindow};
use blog_core::service::{PostDetail, TaggedPage};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDto {
    pub name: String,
    pub slug: String,
    pub url: String,
}

impl From<&Tag> for TagDto {
    fn from(tag: &Tag) -> Self {
        Self {
            name: tag.name.clone(),
            slug: tag.slug.clone(),
            url: format!("/tag/{}/", tag.slug),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDto {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub author_id: Uuid,
    pub body: String,
    pub publish: DateTime<Utc>,
    pub status: PostStatus,
    pub tags: Vec<TagDto>,
    /// Path of the detail page.
    pub url: String,
}

impl From<&Post> for PostDto {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            author_id: post.author_id,
            body: post.body.clone(),
            publish: post.publish,
            status: post.status,
            tags: post.tags.iter().map(TagDto::from).collect(),
            url: format!("/{}/", post.id),
        }
    }
}

/// Comment as shown under a post. The author's email is not exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: i64,
    pub name: String,
    pub body: String,
    pub created: DateTime<Utc>,
}

impl From<&Comment> for CommentDto {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            name: comment.name.clone(),
            body: comment.body.clone(),
            created: comment.created,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl From<PageWindow> for PageMeta {
    fn from(window: PageWindow) -> Self {
        Self {
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_next: window.has_next(),
            has_previous: window.has_previous(),
        }
    }
}

/// Submitted (or empty) form data with its field errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState<T> {
    pub data: T,
    pub errors: FieldErrors,
}

impl<T: Default> FormState<T> {
    pub fn blank() -> Self {
        Self {
            data: T::default(),
            errors: FieldErrors::new(),
        }
    }
}

impl<T> FormState<T> {
    /// Submitted data that passed validation.
    pub fn bound(data: T) -> Self {
        Self {
            data,
            errors: FieldErrors::new(),
        }
    }

    pub fn invalid(data: T, errors: FieldErrors) -> Self {
        Self { data, errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// `/` and `/tag/{slug}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListPage {
    pub posts: Vec<PostDto>,
    pub page: PageMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagDto>,
}

impl From<Page<Post>> for PostListPage {
    fn from(page: Page<Post>) -> Self {
        Self {
            posts: page.items.iter().map(PostDto::from).collect(),
            page: page.window.into(),
            tag: None,
        }
    }
}

impl From<TaggedPage> for PostListPage {
    fn from(tagged: TaggedPage) -> Self {
        let tag = TagDto::from(&tagged.tag);
        Self {
            tag: Some(tag),
            ..Self::from(tagged.page)
        }
    }
}

/// `/{post_id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailPage {
    pub post: PostDto,
    pub comments: Vec<CommentDto>,
    pub similar_posts: Vec<PostDto>,
    pub comment_form: FormState<CommentForm>,
}

impl PostDetailPage {
    pub fn new(detail: &PostDetail, comment_form: FormState<CommentForm>) -> Self {
        Self {
            post: PostDto::from(&detail.post),
            comments: detail.comments.iter().map(CommentDto::from).collect(),
            similar_posts: detail.similar_posts.iter().map(PostDto::from).collect(),
            comment_form,
        }
    }
}

/// `/{post_id}/share/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePage {
    pub post: PostDto,
    pub form: FormState<ShareForm>,
    pub sent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub post: PostDto,
    pub rank: f32,
}

impl From<&RankedPost> for SearchHit {
    fn from(hit: &RankedPost) -> Self {
        Self {
            post: PostDto::from(&hit.post),
            rank: hit.rank,
        }
    }
}

/// `/search/`. `query` is set only when a search actually ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub form: FormState<SearchForm>,
    pub query: Option<String>,
    pub results: Vec<SearchHit>,
}

impl SearchPage {
    pub fn empty(form: FormState<SearchForm>) -> Self {
        Self {
            form,
            query: None,
            results: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub store: String,
}
