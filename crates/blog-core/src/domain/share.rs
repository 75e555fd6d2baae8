//! Composition of "recommend this post" emails.

use crate::forms::ShareFields;

use super::post::Post;

/// Fully composed recommendation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl ShareMessage {
    pub fn compose(post: &Post, post_url: &str, share: &ShareFields) -> Self {
        let subject = format!("{} recommends you read {}", share.name, post.title);
        let body = format!(
            "Read {} at {} \n \n {}'s comments: {}",
            post.title, post_url, share.name, share.comments
        );

        Self {
            to: share.to.clone(),
            subject,
            body,
        }
    }
}
