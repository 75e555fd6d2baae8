//! Tunables of the blog's listings.

/// Posts per listing page.
pub const DEFAULT_PAGE_SIZE: u64 = 2;
/// Minimum normalized rank a search hit must reach.
pub const DEFAULT_SEARCH_RANK_THRESHOLD: f32 = 0.3;
/// Maximum number of similar posts on a detail page.
pub const DEFAULT_SIMILAR_POSTS: u64 = 4;
/// Items in the syndication feed.
pub const DEFAULT_FEED_ITEMS: u64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct BlogSettings {
    pub page_size: u64,
    pub search_rank_threshold: f32,
    pub similar_posts: u64,
    pub feed_items: u64,
    pub feed_title: String,
    pub feed_description: String,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_rank_threshold: DEFAULT_SEARCH_RANK_THRESHOLD,
            similar_posts: DEFAULT_SIMILAR_POSTS,
            feed_items: DEFAULT_FEED_ITEMS,
            feed_title: "My blog".to_string(),
            feed_description: "New posts of my blog.".to_string(),
        }
    }
}
