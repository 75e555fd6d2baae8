//! Post listings, detail page and comment submission.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use serde::Deserialize;

use blog_core::error::DomainError;
use blog_core::forms::{CommentForm, validate_comment};
use blog_core::pagination::PageRequest;
use blog_shared::dto::{FormState, PostDetailPage, PostListPage};

use super::post_url;
use crate::middleware::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    fn request(&self) -> Result<PageRequest, DomainError> {
        Ok(PageRequest::parse(self.page.as_deref())?)
    }
}

/// GET /
pub async fn post_list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.blog.list_published(query.request()?).await?;
    Ok(HttpResponse::Ok().json(PostListPage::from(page)))
}

/// GET /tag/{tag_slug}/
pub async fn post_list_by_tag(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let tag_slug = path.into_inner();
    let tagged = state
        .blog
        .list_published_by_tag(&tag_slug, query.request()?)
        .await?;
    Ok(HttpResponse::Ok().json(PostListPage::from(tagged)))
}

/// GET /{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let detail = state.blog.post_detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PostDetailPage::new(&detail, FormState::blank())))
}

/// POST /{post_id}/
///
/// Redirects back to the post on success; otherwise re-renders the detail
/// page with the submitted data and field errors.
pub async fn post_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let form = form.into_inner();

    match validate_comment(&form) {
        Ok(fields) => {
            let post = state.blog.post(post_id).await?;
            state.blog.add_comment(&post, fields).await?;

            let location = post_url(&req, post.id)?;
            Ok(HttpResponse::Found()
                .insert_header((header::LOCATION, location))
                .finish())
        }
        Err(errors) => {
            tracing::debug!(post_id, fields = ?errors.keys().collect::<Vec<_>>(), "Comment rejected");
            let detail = state.blog.post_detail(post_id).await?;
            let form = FormState::invalid(form, errors);
            Ok(HttpResponse::Ok().json(PostDetailPage::new(&detail, form)))
        }
    }
}
