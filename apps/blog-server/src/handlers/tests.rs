use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use blog_core::domain::{NewPost, Post};
use blog_core::{BlogService, BlogSettings};
use blog_infra::mail::RecordingMailer;
use blog_infra::memory::InMemoryBlogStore;

use super::{configure_routes, not_found};
use crate::observability::RequestIdMiddleware;
use crate::state::{AppState, StoreKind};

struct TestBlog {
    store: Arc<InMemoryBlogStore>,
    mailer: Arc<RecordingMailer>,
    state: AppState,
}

fn test_blog_with(mailer: RecordingMailer) -> TestBlog {
    let store = Arc::new(InMemoryBlogStore::new());
    let mailer = Arc::new(mailer);
    let blog = BlogService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        mailer.clone(),
        BlogSettings::default(),
    );
    TestBlog {
        store,
        mailer,
        state: AppState::new(blog, StoreKind::Memory),
    }
}

fn test_blog() -> TestBlog {
    test_blog_with(RecordingMailer::new())
}

impl TestBlog {
    async fn post(&self, title: &str, body: &str, day: i64, tags: &[&str], published: bool) -> Post {
        let publish = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::days(day);
        let mut post = NewPost::new(Uuid::new_v4(), title, body)
            .publish_at(publish)
            .with_tags(tags.iter().copied());
        if published {
            post = post.published();
        }
        self.state.blog.create_post(post).await.unwrap()
    }
}

macro_rules! app {
    ($blog:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new($blog.state.clone()))
                .configure(configure_routes)
                .default_service(web::to(not_found)),
        )
        .await
    };
}

fn titles(posts: &Value) -> Vec<String> {
    posts
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

#[actix_rt::test]
async fn list_is_paginated_two_per_page() {
    let blog = test_blog();
    for n in 1..=5 {
        blog.post(&format!("Post {n}"), "body", 10 - n, &[], true).await;
    }
    blog.post("Draft", "body", 30, &[], false).await;
    let app = app!(blog);

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&body["posts"]), ["Post 1", "Post 2"]);
    assert_eq!(body["page"]["num_pages"], 3);
    assert_eq!(body["page"]["has_next"], true);

    let req = test::TestRequest::get().uri("/?page=3").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&body["posts"]), ["Post 5"]);

    let req = test::TestRequest::get().uri("/?page=last").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["page"]["number"], 3);
}

#[actix_rt::test]
async fn out_of_range_or_garbage_page_is_not_found() {
    let blog = test_blog();
    for n in 1..=5 {
        blog.post(&format!("Post {n}"), "body", n, &[], true).await;
    }
    let app = app!(blog);

    for uri in ["/?page=4", "/?page=0", "/?page=abc"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_rt::test]
async fn empty_blog_has_one_empty_page() {
    let blog = test_blog();
    let app = app!(blog);

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["posts"].as_array().unwrap().len(), 0);
    assert_eq!(body["page"]["number"], 1);
    assert_eq!(body["page"]["num_pages"], 1);
}

#[actix_rt::test]
async fn tag_listing_includes_selected_tag() {
    let blog = test_blog();
    blog.post("Tagged", "body", 1, &["Rust"], true).await;
    blog.post("Plain", "body", 2, &[], true).await;
    let app = app!(blog);

    let req = test::TestRequest::get().uri("/tag/rust/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(titles(&body["posts"]), ["Tagged"]);
    assert_eq!(body["tag"]["slug"], "rust");
}

#[actix_rt::test]
async fn unknown_tag_is_a_problem_document() {
    let blog = test_blog();
    let app = app!(blog);

    let req = test::TestRequest::get()
        .uri("/tag/missing/")
        .insert_header(("X-Request-ID", "req-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "req-123");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["request_id"], "req-123");
    assert_eq!(body["instance"], "/tag/missing/");
}

#[actix_rt::test]
async fn detail_shows_post_comments_and_similar_posts() {
    let blog = test_blog();
    let post = blog.post("Main", "body", 1, &["rust"], true).await;
    blog.post("Related", "body", 2, &["rust"], true).await;
    blog.post("Unrelated", "body", 3, &["go"], true).await;
    let app = app!(blog);

    let req = test::TestRequest::get()
        .uri(&format!("/{}/", post.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["post"]["title"], "Main");
    assert_eq!(titles(&body["similar_posts"]), ["Related"]);
    assert_eq!(body["comments"].as_array().unwrap().len(), 0);
    assert_eq!(body["comment_form"]["data"]["name"], "");
}

#[actix_rt::test]
async fn draft_detail_is_viewable_by_id() {
    let blog = test_blog();
    let draft = blog.post("Draft", "body", 1, &[], false).await;
    let app = app!(blog);

    let req = test::TestRequest::get()
        .uri(&format!("/{}/", draft.id))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn unknown_or_malformed_post_id_is_not_found() {
    let blog = test_blog();
    let app = app!(blog);

    for uri in ["/42/", "/abc/", "/42/share/", "/no/such/route"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_rt::test]
async fn valid_comment_redirects_and_creates_one_active_comment() {
    let blog = test_blog();
    let post = blog.post("Main", "body", 1, &[], true).await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/{}/", post.id))
        .set_form([("name", "Ada"), ("email", "ada@example.com"), ("body", "Nice")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap();
    assert!(location.ends_with(&format!("/{}/", post.id)));

    let comments = blog.store.all_comments_for_post(post.id).await;
    assert_eq!(comments.len(), 1);
    assert!(comments[0].active);
    assert_eq!(comments[0].name, "Ada");
}

#[actix_rt::test]
async fn invalid_comment_rerenders_with_errors_and_creates_nothing() {
    let blog = test_blog();
    let post = blog.post("Main", "body", 1, &[], true).await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/{}/", post.id))
        .set_form([("name", "Ada"), ("email", "not-an-email"), ("body", "Nice")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["comment_form"]["errors"]["email"].is_array());
    assert_eq!(body["comment_form"]["data"]["email"], "not-an-email");
    assert!(blog.store.all_comments_for_post(post.id).await.is_empty());
}

#[actix_rt::test]
async fn comment_on_missing_post_is_not_found() {
    let blog = test_blog();
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri("/7/")
        .set_form([("name", "Ada"), ("email", "ada@example.com"), ("body", "Nice")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn share_of_draft_is_not_found_on_get_and_post() {
    let blog = test_blog();
    let draft = blog.post("Draft", "body", 1, &[], false).await;
    let app = app!(blog);
    let uri = format!("/{}/share/", draft.id);

    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_form([("name", "Ada"), ("to", "friend@example.com")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    assert!(blog.mailer.sent().await.is_empty());
}

#[actix_rt::test]
async fn share_sends_mail_with_absolute_link() {
    let blog = test_blog();
    let post = blog.post("Ownership", "body", 1, &[], true).await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/{}/share/", post.id))
        .set_form([
            ("name", "Ada"),
            ("to", "friend@example.com"),
            ("comments", "Worth it"),
        ])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["sent"], true);
    let sent = blog.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "friend@example.com");
    assert_eq!(sent[0].subject, "Ada recommends you read Ownership");
    assert!(sent[0].body.contains(&format!("http://localhost:8080/{}/", post.id)));
    assert!(sent[0].body.contains("Ada's comments: Worth it"));
}

#[actix_rt::test]
async fn invalid_share_form_is_not_sent() {
    let blog = test_blog();
    let post = blog.post("Ownership", "body", 1, &[], true).await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/{}/share/", post.id))
        .set_form([("name", "Ada"), ("to", "nobody")])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["sent"], false);
    assert!(body["form"]["errors"]["to"].is_array());
    assert!(blog.mailer.sent().await.is_empty());
}

#[actix_rt::test]
async fn mail_failure_is_a_server_error() {
    let blog = test_blog_with(RecordingMailer::failing("connection refused"));
    let post = blog.post("Ownership", "body", 1, &[], true).await;
    let app = app!(blog);

    let req = test::TestRequest::post()
        .uri(&format!("/{}/share/", post.id))
        .set_form([("name", "Ada"), ("to", "friend@example.com")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("detail").is_none());
}

#[actix_rt::test]
async fn search_ranks_published_posts() {
    let blog = test_blog();
    blog.post("Django tips", "Short.", 1, &[], true).await;
    blog.post("Frameworks", "django django django django", 2, &[], true).await;
    blog.post("Aside", "One django mention.", 3, &[], true).await;
    blog.post("Django draft", "django", 4, &[], false).await;
    let app = app!(blog);

    let req = test::TestRequest::get()
        .uri("/search/?query=django")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["query"], "django");
    let found: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|hit| hit["post"]["title"].as_str().unwrap())
        .collect();
    assert_eq!(found, ["Django tips", "Frameworks"]);
}

#[actix_rt::test]
async fn search_without_or_with_blank_query_runs_nothing() {
    let blog = test_blog();
    blog.post("Django tips", "Short.", 1, &[], true).await;
    let app = app!(blog);

    let req = test::TestRequest::get().uri("/search/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["query"].is_null());
    assert!(body["form"]["errors"].as_object().unwrap().is_empty());

    let req = test::TestRequest::get().uri("/search/?query=+").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["query"].is_null());
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
    assert!(body["form"]["data"]["query"].is_null());
    assert!(body["form"]["errors"].as_object().unwrap().is_empty());
}

#[actix_rt::test]
async fn search_echoes_submitted_query() {
    let blog = test_blog();
    blog.post("Django tips", "Short.", 1, &[], true).await;
    let app = app!(blog);

    let req = test::TestRequest::get()
        .uri("/search/?query=+Django+")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["query"], " Django ");
    assert_eq!(body["form"]["data"]["query"], " Django ");
    assert_eq!(body["results"][0]["post"]["title"], "Django tips");
}

#[actix_rt::test]
async fn feed_lists_latest_published_posts() {
    let blog = test_blog();
    for n in 0..6 {
        blog.post(&format!("Post {n}"), "Some <b>bold</b> words", n, &[], true)
            .await;
    }
    blog.post("Draft", "body", 10, &[], false).await;
    let app = app!(blog);

    let req = test::TestRequest::get().uri("/feed/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("application/rss+xml"));

    let body = test::read_body(resp).await;
    let xml = std::str::from_utf8(&body).unwrap();
    assert!(xml.contains("<title>My blog</title>"));
    assert_eq!(xml.matches("<item>").count(), 5);
    assert!(xml.contains("<title>Post 5</title>"));
    assert!(!xml.contains("Post 0"));
    assert!(!xml.contains("Draft"));
    assert!(xml.contains("&lt;b&gt;bold&lt;/b&gt;"));
}

#[actix_rt::test]
async fn health_reports_store() {
    let blog = test_blog();
    let app = app!(blog);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
}
