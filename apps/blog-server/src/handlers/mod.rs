//! HTTP handlers and route configuration.

mod feed;
mod health;
mod posts;
mod search;
mod share;

#[cfg(test)]
mod tests;

use actix_web::{HttpRequest, HttpResponse, web};

use crate::middleware::error::{AppError, AppResult};

/// Configure all application routes.
///
/// Fixed paths are registered before `/{post_id}/` so they are not taken for
/// post ids.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::NotFound(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::FormConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/health", web::get().to(health::health_check))
    .service(
        web::resource("/")
            .name("post_list")
            .route(web::get().to(posts::post_list)),
    )
    .route("/search/", web::get().to(search::post_search))
    .route("/feed/", web::get().to(feed::latest_posts_feed))
    .route("/tag/{tag_slug}/", web::get().to(posts::post_list_by_tag))
    .service(
        web::resource("/{post_id}/")
            .name("post_detail")
            .route(web::get().to(posts::post_detail))
            .route(web::post().to(posts::post_comment)),
    )
    .service(
        web::resource("/{post_id}/share/")
            .name("post_share")
            .route(web::get().to(share::share_form))
            .route(web::post().to(share::share_post)),
    );
}

/// Fallback for unmatched routes.
pub async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(format!("No route for {}", req.path())))
}

/// Absolute URL of a post's detail page.
fn post_url(req: &HttpRequest, post_id: i64) -> AppResult<String> {
    req.url_for("post_detail", [post_id.to_string()])
        .map(|url| url.to_string())
        .map_err(|e| AppError::Internal(format!("Cannot build post URL: {}", e)))
}
