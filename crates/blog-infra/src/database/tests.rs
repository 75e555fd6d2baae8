use std::collections::BTreeMap;

use blog_core::domain::{NewComment, NewPost};
use blog_core::error::RepoError;
use blog_core::ports::{CommentRepository, PostRepository, TagRepository};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction, Value};

use crate::database::entity::{comment, post, post_tag, tag};
use crate::database::postgres_repo::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository, SEARCH_SQL,
    SIMILAR_POSTS_SQL,
};

fn post_model(id: i64, title: &str) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id,
        title: title.to_owned(),
        slug: title.to_lowercase().replace(' ', "-"),
        author_id: uuid::Uuid::nil(),
        body: "Body".to_owned(),
        publish: now.into(),
        created_at: now.into(),
        updated_at: now.into(),
        status: "published".to_owned(),
    }
}

fn tag_model(id: i64, name: &str, slug: &str) -> tag::Model {
    tag::Model {
        id,
        name: name.to_owned(),
        slug: slug.to_owned(),
    }
}

/// A search result row: every post column plus `rank`.
fn ranked_row(model: post::Model, rank: f32) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([
        ("id", model.id.into()),
        ("title", model.title.into()),
        ("slug", model.slug.into()),
        ("author_id", model.author_id.into()),
        ("body", model.body.into()),
        ("publish", model.publish.into()),
        ("created_at", model.created_at.into()),
        ("updated_at", model.updated_at.into()),
        ("status", model.status.into()),
        ("rank", rank.into()),
    ])
}

fn comment_model(id: i64, post_id: i64, name: &str) -> comment::Model {
    let now = chrono::Utc::now();
    comment::Model {
        id,
        post_id,
        name: name.to_owned(),
        email: format!("{}@example.com", name.to_lowercase()),
        body: "Great read".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
        active: true,
    }
}

#[tokio::test]
async fn test_insert_comment_returns_active_comment() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![comment_model(11, 3, "Ada")]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let comment = repo
        .insert(NewComment::new(
            3,
            "Ada".to_owned(),
            "ada@example.com".to_owned(),
            "Great read".to_owned(),
        ))
        .await
        .unwrap();

    assert_eq!(comment.id, 11);
    assert_eq!(comment.post_id, 3);
    assert!(comment.active);
}

#[tokio::test]
async fn test_list_active_comments() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![comment_model(2, 5, "Bea"), comment_model(1, 5, "Ada")]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let comments = repo.list_active_for_post(5).await.unwrap();

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].name, "Bea");
}

#[tokio::test]
async fn test_find_tag_by_slug() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![tag::Model {
            id: 4,
            name: "Web Dev".to_owned(),
            slug: "web-dev".to_owned(),
        }]])
        .into_connection();

    let repo = PostgresTagRepository::new(db);
    let tag = repo.find_by_slug("web-dev").await.unwrap().unwrap();

    assert_eq!(tag.id, 4);
    assert_eq!(tag.name, "Web Dev");
}

#[tokio::test]
async fn test_find_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    assert!(repo.find_by_id(42).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = repo.delete(42).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_similar_posts_query_binds_post_status_and_limit() {
    let target = post_model(7, "Target").into_domain(Vec::new()).unwrap();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(9, "Two shared"), post_model(8, "One shared")]])
        .append_query_results([vec![
            post_tag::Model { post_id: 9, tag_id: 1 },
            post_tag::Model { post_id: 9, tag_id: 2 },
            post_tag::Model { post_id: 8, tag_id: 1 },
        ]])
        .append_query_results([vec![tag_model(1, "rust", "rust"), tag_model(2, "web", "web")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let similar = repo.similar_published(&target, 4).await.unwrap();

    let titles: Vec<&str> = similar.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Two shared", "One shared"]);
    assert_eq!(similar[0].tags.len(), 2);
    assert_eq!(similar[1].tags[0].slug, "rust");

    let log = repo.db.into_transaction_log();
    assert_eq!(
        log[0],
        Transaction::from_sql_and_values(
            DatabaseBackend::Postgres,
            SIMILAR_POSTS_SQL,
            [7i64.into(), "published".into(), 4i64.into()],
        )
    );
}

#[tokio::test]
async fn test_similar_posts_limit_saturates() {
    let target = post_model(7, "Target").into_domain(Vec::new()).unwrap();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    assert!(repo.similar_published(&target, u64::MAX).await.unwrap().is_empty());

    let log = repo.db.into_transaction_log();
    assert_eq!(
        log[0],
        Transaction::from_sql_and_values(
            DatabaseBackend::Postgres,
            SIMILAR_POSTS_SQL,
            [7i64.into(), "published".into(), i64::MAX.into()],
        )
    );
}

#[tokio::test]
async fn test_search_maps_ranked_rows_in_order() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            ranked_row(post_model(3, "Learning Django"), 0.61),
            ranked_row(post_model(5, "Web frameworks"), 0.32),
        ]])
        .append_query_results([vec![post_tag::Model { post_id: 5, tag_id: 1 }]])
        .append_query_results([vec![tag_model(1, "django", "django")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let hits = repo.search_published("django", 0.3).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].post.id, 3);
    assert_eq!(hits[0].rank, 0.61);
    assert!(hits[0].post.tags.is_empty());
    assert_eq!(hits[1].post.tags[0].name, "django");

    let log = repo.db.into_transaction_log();
    assert_eq!(
        log[0],
        Transaction::from_sql_and_values(
            DatabaseBackend::Postgres,
            SEARCH_SQL,
            ["django".into(), "published".into(), 0.3f32.into()],
        )
    );
}

#[tokio::test]
async fn test_search_without_hits_skips_tag_loading() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    assert!(repo.search_published("nothing", 0.3).await.unwrap().is_empty());
    assert_eq!(repo.db.into_transaction_log().len(), 1);
}

#[tokio::test]
async fn test_insert_post_reuses_tag_with_same_slug_in_one_transaction() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(12, "Tagged")]])
        .append_query_results([vec![tag_model(4, "Rust", "rust")]])
        .append_query_results([vec![post_tag::Model { post_id: 12, tag_id: 4 }]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let created = repo
        .insert(
            NewPost::new(uuid::Uuid::nil(), "Tagged", "Body")
                .published()
                .with_tags(["rust", "RUST"]),
        )
        .await
        .unwrap();

    assert_eq!(created.id, 12);
    assert_eq!(created.tags.len(), 1);
    assert_eq!(created.tags[0].id, 4);
    assert_eq!(created.tags[0].name, "Rust");

    // post row, tag links and commit share a single transaction
    assert_eq!(repo.db.into_transaction_log().len(), 1);
}

#[test]
fn test_unknown_status_is_a_query_error() {
    let now = chrono::Utc::now();
    let model = post::Model {
        id: 1,
        title: "Broken".to_owned(),
        slug: "broken".to_owned(),
        author_id: uuid::Uuid::new_v4(),
        body: String::new(),
        publish: now.into(),
        created_at: now.into(),
        updated_at: now.into(),
        status: "archived".to_owned(),
    };

    assert!(matches!(model.into_domain(Vec::new()), Err(RepoError::Query(_))));
}
