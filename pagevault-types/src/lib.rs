pub mod bookmark;
pub mod tag;

#[cfg(feature = "diesel")]
pub mod schema;

#[cfg(feature = "diesel")]
pub use schema::*;

// Re-export for convenience
pub use bookmark::{Bookmark, BookmarkId, CreateBookmark, NewBookmark};
pub use tag::{BookmarkTag, ResolveTag, Tag, TagId};
