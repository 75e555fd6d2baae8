use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity - a visitor's reply attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub active: bool,
}

/// Comment ready to be inserted. Always starts out active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub post_id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
    pub active: bool,
}

impl NewComment {
    pub fn new(post_id: i64, name: String, email: String, body: String) -> Self {
        Self {
            post_id,
            name,
            email,
            body,
            active: true,
        }
    }
}
