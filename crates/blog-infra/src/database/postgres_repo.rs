//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbBackend, EntityTrait, FromQueryResult,
    JoinType, LoaderTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Select, Set, Statement, TransactionTrait,
};

use blog_core::domain::{
    Comment, NewComment, NewPost, Post, PostStatus, RankedPost, Tag, TagName,
};
use blog_core::error::RepoError;
use blog_core::ports::{CommentRepository, PostRepository, TagRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// Published posts sharing tags with `$1`, most shared tags first.
pub(crate) const SIMILAR_POSTS_SQL: &str = r#"
SELECT p.*
FROM posts p
INNER JOIN post_tags pt ON pt.post_id = p.id
WHERE p.status = $2
  AND p.id <> $1
  AND pt.tag_id IN (SELECT tag_id FROM post_tags WHERE post_id = $1)
GROUP BY p.id
ORDER BY COUNT(pt.tag_id) DESC, p.publish DESC
LIMIT $3
"#;

/// Weighted full-text rank: title weight A, body weight B.
///
/// The vector expression matches the `posts_search_idx` GIN index.
pub(crate) const SEARCH_SQL: &str = r#"
SELECT *
FROM (
    SELECT p.*,
           ts_rank(
               setweight(to_tsvector('english', coalesce(p.title, '')), 'A')
                   || setweight(to_tsvector('english', coalesce(p.body, '')), 'B'),
               plainto_tsquery('english', $1)
           ) AS rank
    FROM posts p
    WHERE p.status = $2
      AND (setweight(to_tsvector('english', coalesce(p.title, '')), 'A')
           || setweight(to_tsvector('english', coalesce(p.body, '')), 'B'))
          @@ plainto_tsquery('english', $1)
) ranked
WHERE rank >= $3
ORDER BY rank DESC
"#;

#[derive(Debug, FromQueryResult)]
struct RankedRow {
    id: i64,
    title: String,
    slug: String,
    author_id: uuid::Uuid,
    body: String,
    publish: sea_orm::prelude::DateTimeWithTimeZone,
    created_at: sea_orm::prelude::DateTimeWithTimeZone,
    updated_at: sea_orm::prelude::DateTimeWithTimeZone,
    status: String,
    rank: f32,
}

impl RankedRow {
    fn split(self) -> (post::Model, f32) {
        let model = post::Model {
            id: self.id,
            title: self.title,
            slug: self.slug,
            author_id: self.author_id,
            body: self.body,
            publish: self.publish,
            created_at: self.created_at,
            updated_at: self.updated_at,
            status: self.status,
        };
        (model, self.rank)
    }
}

/// Replace the tag links of `post_id` inside `txn`, reusing tags by slug and
/// creating the missing ones.
async fn assign_tags(
    txn: &DatabaseTransaction,
    post_id: i64,
    names: &[String],
) -> Result<Vec<Tag>, RepoError> {
    PostTagEntity::delete_many()
        .filter(post_tag::Column::PostId.eq(post_id))
        .exec(txn)
        .await
        .map_err(map_db_err)?;

    let mut tags = Vec::new();
    for wanted in TagName::resolve(names) {
        let existing = TagEntity::find()
            .filter(tag::Column::Slug.eq(wanted.slug.as_str()))
            .one(txn)
            .await
            .map_err(map_db_err)?;

        let model = match existing {
            Some(model) => model,
            None => tag::ActiveModel {
                name: Set(wanted.name),
                slug: Set(wanted.slug),
                ..Default::default()
            }
            .insert(txn)
            .await
            .map_err(map_db_err)?,
        };

        post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(model.id),
        }
        .insert(txn)
        .await
        .map_err(map_db_err)?;

        tags.push(Tag::from(model));
    }

    Ok(tags)
}

impl PostgresPostRepository {
    fn published() -> Select<PostEntity> {
        PostEntity::find().filter(post::Column::Status.eq(PostStatus::Published.as_str()))
    }

    fn published_with_tag(tag_id: Option<i64>) -> Select<PostEntity> {
        let select = Self::published();
        match tag_id {
            Some(tag_id) => select
                .join(JoinType::InnerJoin, post::Relation::PostTags.def())
                .filter(post_tag::Column::TagId.eq(tag_id)),
            None => select,
        }
    }

    /// Convert models to domain posts with their tags, keeping order.
    async fn with_tags(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let tags = models
            .load_many_to_many(TagEntity, PostTagEntity, &self.db)
            .await
            .map_err(map_db_err)?;

        models
            .into_iter()
            .zip(tags)
            .map(|(model, tags)| model.into_domain(tags.into_iter().map(Tag::from).collect()))
            .collect()
    }

    async fn one_with_tags(&self, model: Option<post::Model>) -> Result<Option<Post>, RepoError> {
        match model {
            Some(model) => Ok(self.with_tags(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        self.one_with_tags(model).await
    }

    async fn find_published_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let model = Self::published()
            .filter(post::Column::Id.eq(id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        self.one_with_tags(model).await
    }

    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .order_by_desc(post::Column::Publish)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        self.with_tags(models).await
    }

    async fn list_published(
        &self,
        tag_id: Option<i64>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let models = Self::published_with_tag(tag_id)
            .order_by_desc(post::Column::Publish)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        self.with_tags(models).await
    }

    async fn count_published(&self, tag_id: Option<i64>) -> Result<u64, RepoError> {
        Self::published_with_tag(tag_id)
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn similar_published(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            SIMILAR_POSTS_SQL,
            [
                post.id.into(),
                PostStatus::Published.as_str().into(),
                i64::try_from(limit).unwrap_or(i64::MAX).into(),
            ],
        );

        let models = PostEntity::find()
            .from_raw_sql(stmt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        self.with_tags(models).await
    }

    async fn search_published(
        &self,
        query: &str,
        threshold: f32,
    ) -> Result<Vec<RankedPost>, RepoError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            SEARCH_SQL,
            [
                query.into(),
                PostStatus::Published.as_str().into(),
                threshold.into(),
            ],
        );

        let rows = RankedRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let (models, ranks): (Vec<post::Model>, Vec<f32>) =
            rows.into_iter().map(RankedRow::split).unzip();
        let posts = self.with_tags(models).await?;

        Ok(posts
            .into_iter()
            .zip(ranks)
            .map(|(post, rank)| RankedPost { post, rank })
            .collect())
    }

    async fn slug_taken(
        &self,
        slug: &str,
        date: NaiveDate,
        exclude_id: Option<i64>,
    ) -> Result<bool, RepoError> {
        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1);

        let mut select = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Publish.gte(day_start))
            .filter(post::Column::Publish.lt(day_end));
        if let Some(id) = exclude_id {
            select = select.filter(post::Column::Id.ne(id));
        }

        let count = select.count(&self.db).await.map_err(map_db_err)?;
        Ok(count > 0)
    }

    async fn insert(&self, post: NewPost) -> Result<Post, RepoError> {
        let tag_names = post.tags.clone();
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let active: post::ActiveModel = post.into();
        let model = active.insert(&txn).await.map_err(map_db_err)?;
        let tags = assign_tags(&txn, model.id, &tag_names).await?;

        txn.commit().await.map_err(map_db_err)?;
        tracing::debug!(post_id = model.id, tags = tags.len(), "Post row inserted");
        model.into_domain(tags)
    }

    async fn update(&self, post: Post, tag_names: &[String]) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let active: post::ActiveModel = post.into();
        let model = active.update(&txn).await.map_err(map_db_err)?;
        let tags = assign_tags(&txn, model.id, tag_names).await?;

        txn.commit().await.map_err(map_db_err)?;
        model.into_domain(tags)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        // comments and post_tags rows go with it via ON DELETE CASCADE
        self.delete_by_id(id).await
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn insert(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let active: comment::ActiveModel = comment.into();
        let model = active.insert(&self.db).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn list_active_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let models = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Active.eq(true))
            .order_by_desc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let model = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.map(Into::into))
    }
}
