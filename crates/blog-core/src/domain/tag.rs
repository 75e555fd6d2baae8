use serde::{Deserialize, Serialize};

use super::slug::slugify;

/// A label from the shared tag vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// A tag name as submitted on a post, keyed by its slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagName {
    pub name: String,
    pub slug: String,
}

impl TagName {
    /// One entry per distinct slug, in submission order.
    ///
    /// Names are trimmed and the first spelling of a slug wins, so "Rust" and
    /// "rust" name the same tag. Names without any sluggable character are
    /// dropped.
    pub fn resolve(names: &[String]) -> Vec<TagName> {
        let mut resolved: Vec<TagName> = Vec::new();
        for name in names.iter().map(|n| n.trim()) {
            let slug = slugify(name);
            if slug.is_empty() || resolved.iter().any(|t| t.slug == slug) {
                continue;
            }
            resolved.push(TagName {
                name: name.to_string(),
                slug,
            });
        }
        resolved
    }
}
