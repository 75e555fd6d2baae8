//! Recommend a post by email.

use actix_web::{HttpRequest, HttpResponse, web};

use blog_core::forms::{ShareForm, validate_share};
use blog_shared::dto::{FormState, PostDto, SharePage};

use super::post_url;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /{post_id}/share/
pub async fn share_form(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = state.blog.shareable_post(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(SharePage {
        post: PostDto::from(&post),
        form: FormState::blank(),
        sent: false,
    }))
}

/// POST /{post_id}/share/
pub async fn share_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    form: web::Form<ShareForm>,
) -> AppResult<HttpResponse> {
    let post = state.blog.shareable_post(path.into_inner()).await?;
    let form = form.into_inner();

    let page = match validate_share(&form) {
        Ok(fields) => {
            let url = post_url(&req, post.id)?;
            state.blog.share_post(&post, &url, &fields).await?;
            SharePage {
                post: PostDto::from(&post),
                form: FormState::bound(form),
                sent: true,
            }
        }
        Err(errors) => SharePage {
            post: PostDto::from(&post),
            form: FormState::invalid(form, errors),
            sent: false,
        },
    };

    Ok(HttpResponse::Ok().json(page))
}
