//! Domain entities - the core business objects.

mod comment;
mod post;
mod share;
mod slug;
mod tag;

pub use comment::{Comment, NewComment};
pub use post::{NewPost, Post, PostStatus, RankedPost, UnknownStatus};
pub use share::ShareMessage;
pub use slug::slugify;
pub use tag::{Tag, TagName};
