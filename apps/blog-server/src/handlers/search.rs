//! Full-text search over published posts.

use actix_web::{HttpResponse, web};

use blog_core::forms::{SearchForm, validate_search};
use blog_shared::dto::{FormState, SearchHit, SearchPage};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /search/?query=...
///
/// A missing or blank query renders the unbound form. Otherwise `query`
/// echoes the submitted text as is.
pub async fn post_search(
    state: web::Data<AppState>,
    query: web::Query<SearchForm>,
) -> AppResult<HttpResponse> {
    let form = query.into_inner();
    let terms = match validate_search(&form) {
        Ok(terms) => terms,
        Err(_) => {
            if form.is_submitted() {
                tracing::debug!("Blank search query ignored");
            }
            return Ok(HttpResponse::Ok().json(SearchPage::empty(FormState::blank())));
        }
    };

    let results = state.blog.search(&terms).await?;
    let page = SearchPage {
        query: form.query.clone(),
        form: FormState::bound(form),
        results: results.iter().map(SearchHit::from).collect(),
    };

    Ok(HttpResponse::Ok().json(page))
}
