//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use blog_core::domain::{NewPost, Post, Tag};
use blog_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub author_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub publish: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
    #[sea_orm(has_many = "super::post_tag::Entity")]
    PostTags,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::post_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostTags.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::post_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::post_tag::Relation::Post.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain post, attaching already loaded tags.
    pub fn into_domain(self, mut tags: Vec<Tag>) -> Result<Post, RepoError> {
        let status = self
            .status
            .parse()
            .map_err(|e| RepoError::Query(format!("post {}: {}", self.id, e)))?;
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Post {
            id: self.id,
            title: self.title,
            slug: self.slug,
            author_id: self.author_id,
            body: self.body,
            publish: self.publish.into(),
            created: self.created_at.into(),
            updated: self.updated_at.into(),
            status,
            tags,
        })
    }
}

/// Insert model for a new post; the id is assigned by the database.
impl From<NewPost> for ActiveModel {
    fn from(post: NewPost) -> Self {
        let now = chrono::Utc::now();
        Self {
            title: Set(post.title),
            slug: Set(post.slug),
            author_id: Set(post.author_id),
            body: Set(post.body),
            publish: Set(post.publish.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            status: Set(post.status.as_str().to_string()),
            ..Default::default()
        }
    }
}

/// Full update model for an existing post.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            slug: Set(post.slug),
            author_id: Set(post.author_id),
            body: Set(post.body),
            publish: Set(post.publish.into()),
            created_at: Set(post.created.into()),
            updated_at: Set(post.updated.into()),
            status: Set(post.status.as_str().to_string()),
        }
    }
}
