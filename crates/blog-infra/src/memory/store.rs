//! In-memory blog store - used when no database is configured, and in tests.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use blog_core::domain::{Comment, NewComment, NewPost, Post, RankedPost, Tag, TagName};
use blog_core::error::RepoError;
use blog_core::ports::{CommentRepository, PostRepository, TagRepository};

/// Weight of a query term found in the title.
const TITLE_WEIGHT: f32 = 1.0;
/// Ceiling of a query term found only in the body.
const BODY_WEIGHT: f32 = 0.4;

#[derive(Default)]
struct State {
    posts: BTreeMap<i64, Post>,
    comments: Vec<Comment>,
    tags: BTreeMap<i64, Tag>,
    post_tags: BTreeSet<(i64, i64)>,
    last_post_id: i64,
    last_comment_id: i64,
    last_tag_id: i64,
}

impl State {
    fn tags_of(&self, post_id: i64) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .post_tags
            .range((post_id, i64::MIN)..=(post_id, i64::MAX))
            .filter_map(|(_, tag_id)| self.tags.get(tag_id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    fn hydrate(&self, post: &Post) -> Post {
        let mut post = post.clone();
        post.tags = self.tags_of(post.id);
        post
    }

    /// Published posts, newest first.
    fn published(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.values().filter(|p| p.is_published()).collect();
        sort_newest_first(&mut posts);
        posts
    }

    /// Replace the tag links of a post, reusing tags by slug.
    fn assign_tags(&mut self, post_id: i64, names: &[String]) {
        self.post_tags.retain(|(p, _)| *p != post_id);

        for wanted in TagName::resolve(names) {
            let existing = self
                .tags
                .values()
                .find(|t| t.slug == wanted.slug)
                .map(|t| t.id);
            let tag_id = match existing {
                Some(id) => id,
                None => {
                    self.last_tag_id += 1;
                    let tag = Tag {
                        id: self.last_tag_id,
                        name: wanted.name,
                        slug: wanted.slug,
                    };
                    self.tags.insert(tag.id, tag);
                    self.last_tag_id
                }
            };
            self.post_tags.insert((post_id, tag_id));
        }
    }

    fn published_with_tag(&self, tag_id: Option<i64>) -> Vec<&Post> {
        let mut posts = self.published();
        if let Some(tag_id) = tag_id {
            posts.retain(|p| self.post_tags.contains(&(p.id, tag_id)));
        }
        posts
    }
}

fn sort_newest_first(posts: &mut [&Post]) {
    posts.sort_by_key(|p| (Reverse(p.publish), Reverse(p.id)));
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Relevance of `post` for the query terms, in `[0, 1]`.
///
/// Each term scores the title weight when the title contains it, otherwise a
/// share of the body weight that grows with the number of body occurrences.
/// The rank is the mean over terms.
fn rank(post: &Post, terms: &[String]) -> f32 {
    if terms.is_empty() {
        return 0.0;
    }

    let title = words(&post.title);
    let body = words(&post.body);

    let total: f32 = terms
        .iter()
        .map(|term| {
            if title.contains(term) {
                TITLE_WEIGHT
            } else {
                let hits = body.iter().filter(|w| *w == term).count() as f32;
                BODY_WEIGHT * (1.0 - 1.0 / (1.0 + hits))
            }
        })
        .sum();

    total / terms.len() as f32
}

/// Blog store backed by process memory.
///
/// Implements every storage port so a single instance can back the post,
/// comment and tag repositories. Data is lost on restart.
#[derive(Default)]
pub struct InMemoryBlogStore {
    state: RwLock<State>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every comment of a post, active or not, newest first.
    pub async fn all_comments_for_post(&self, post_id: i64) -> Vec<Comment> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| (Reverse(c.created), Reverse(c.id)));
        comments
    }

    /// Flip a comment's visibility.
    pub async fn set_comment_active(&self, comment_id: i64, active: bool) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or(RepoError::NotFound)?;
        comment.active = active;
        comment.updated = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryBlogStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.get(&id).map(|p| state.hydrate(p)))
    }

    async fn find_published_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .get(&id)
            .filter(|p| p.is_published())
            .map(|p| state.hydrate(p)))
    }

    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;
        let mut posts: Vec<&Post> = state.posts.values().collect();
        sort_newest_first(&mut posts);
        Ok(posts.into_iter().map(|p| state.hydrate(p)).collect())
    }

    async fn list_published(
        &self,
        tag_id: Option<i64>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .published_with_tag(tag_id)
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|p| state.hydrate(p))
            .collect())
    }

    async fn count_published(&self, tag_id: Option<i64>) -> Result<u64, RepoError> {
        let state = self.state.read().await;
        Ok(state.published_with_tag(tag_id).len() as u64)
    }

    async fn similar_published(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;
        let wanted: HashSet<i64> = state.tags_of(post.id).iter().map(|t| t.id).collect();

        let mut scored: Vec<(usize, &Post)> = state
            .published()
            .into_iter()
            .filter(|p| p.id != post.id)
            .map(|p| {
                let shared = state
                    .tags_of(p.id)
                    .iter()
                    .filter(|t| wanted.contains(&t.id))
                    .count();
                (shared, p)
            })
            .filter(|(shared, _)| *shared > 0)
            .collect();

        // stable sort keeps the newest-first order among equal counts
        scored.sort_by_key(|(shared, _)| Reverse(*shared));

        Ok(scored
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|(_, p)| state.hydrate(p))
            .collect())
    }

    async fn search_published(
        &self,
        query: &str,
        threshold: f32,
    ) -> Result<Vec<RankedPost>, RepoError> {
        let mut terms = words(query);
        terms.sort();
        terms.dedup();

        let state = self.state.read().await;
        let mut hits: Vec<RankedPost> = state
            .published()
            .into_iter()
            .map(|p| RankedPost {
                rank: rank(p, &terms),
                post: state.hydrate(p),
            })
            .filter(|hit| hit.rank >= threshold)
            .collect();

        hits.sort_by(|a, b| b.rank.total_cmp(&a.rank));
        Ok(hits)
    }

    async fn slug_taken(
        &self,
        slug: &str,
        date: NaiveDate,
        exclude_id: Option<i64>,
    ) -> Result<bool, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.values().any(|p| {
            p.slug == slug && p.publish_date() == date && Some(p.id) != exclude_id
        }))
    }

    async fn insert(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;
        state.last_post_id += 1;

        let now = Utc::now();
        let stored = Post {
            id: state.last_post_id,
            title: post.title,
            slug: post.slug,
            author_id: post.author_id,
            body: post.body,
            publish: post.publish,
            created: now,
            updated: now,
            status: post.status,
            tags: Vec::new(),
        };
        state.posts.insert(stored.id, stored.clone());
        state.assign_tags(stored.id, &post.tags);
        Ok(state.hydrate(&stored))
    }

    async fn update(&self, post: Post, tag_names: &[String]) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;
        let stored = state.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        *stored = Post {
            tags: Vec::new(),
            ..post
        };
        let id = stored.id;
        state.assign_tags(id, tag_names);
        Ok(state.hydrate(&state.posts[&id]))
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        state.posts.remove(&id).ok_or(RepoError::NotFound)?;
        state.comments.retain(|c| c.post_id != id);
        state.post_tags.retain(|(post_id, _)| *post_id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryBlogStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        state.last_comment_id += 1;

        let now = Utc::now();
        let stored = Comment {
            id: state.last_comment_id,
            post_id: comment.post_id,
            name: comment.name,
            email: comment.email,
            body: comment.body,
            created: now,
            updated: now,
            active: comment.active,
        };
        state.comments.push(stored.clone());
        Ok(stored)
    }

    async fn list_active_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let mut comments = self.all_comments_for_post(post_id).await;
        comments.retain(|c| c.active);
        Ok(comments)
    }
}

#[async_trait]
impl TagRepository for InMemoryBlogStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let state = self.state.read().await;
        Ok(state.tags.values().find(|t| t.slug == slug).cloned())
    }
}
