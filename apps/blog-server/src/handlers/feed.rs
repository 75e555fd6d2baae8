//! RSS 2.0 feed of the latest published posts.

use actix_web::{HttpRequest, HttpResponse, web};

use blog_core::BlogSettings;
use blog_core::domain::Post;

use super::post_url;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Words of the body kept in an item description.
const DESCRIPTION_WORDS: usize = 30;

/// GET /feed/
pub async fn latest_posts_feed(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let posts = state.blog.latest_posts().await?;

    let channel_link = req
        .url_for_static("post_list")
        .map_err(|e| AppError::Internal(format!("Cannot build feed link: {}", e)))?
        .to_string();

    let items = posts
        .iter()
        .map(|post| Ok((post, post_url(&req, post.id)?)))
        .collect::<AppResult<Vec<_>>>()?;

    let xml = render_rss(state.blog.settings(), &channel_link, &items);

    Ok(HttpResponse::Ok()
        .content_type("application/rss+xml; charset=utf-8")
        .body(xml))
}

fn render_rss(settings: &BlogSettings, channel_link: &str, items: &[(&Post, String)]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    xml.push_str(r#"<rss version="2.0"><channel>"#);
    push_element(&mut xml, "title", &settings.feed_title);
    push_element(&mut xml, "link", channel_link);
    push_element(&mut xml, "description", &settings.feed_description);

    for (post, link) in items {
        xml.push_str("<item>");
        push_element(&mut xml, "title", &post.title);
        push_element(&mut xml, "link", link);
        push_element(
            &mut xml,
            "description",
            &truncate_words(&post.body, DESCRIPTION_WORDS),
        );
        push_element(&mut xml, "pubDate", &post.publish.to_rfc2822());
        push_element(&mut xml, "guid", link);
        xml.push_str("</item>");
    }

    xml.push_str("</channel></rss>");
    xml
}

fn push_element(xml: &mut String, name: &str, text: &str) {
    xml.push('<');
    xml.push_str(name);
    xml.push('>');
    xml.push_str(&escape_xml(text));
    xml.push_str("</");
    xml.push_str(name);
    xml.push('>');
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// First `limit` whitespace-separated words, with an ellipsis when cut.
fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return words.join(" ");
    }
    format!("{} …", words[..limit].join(" "))
}
