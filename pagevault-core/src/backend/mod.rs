//! Storage collaborator seen by the tagging core.
//!
//! The core never talks to a database directly. Every read and write goes
//! through [`Backend`], which exposes one typed operation per shape the core
//! needs over the three collections (bookmarks, tags, associations).

use std::future::Future;

use pagevault_types::{Bookmark, BookmarkId, BookmarkTag, NewBookmark, Tag};

use crate::errors::BackendError;

mod memory;
pub use memory::MemoryBackend;

/// Ordering of bookmarks by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Newest first.
    #[default]
    Desc,
    Asc,
}

pub trait Backend: Send {
    fn insert_bookmark(
        &mut self,
        new: &NewBookmark,
    ) -> impl Future<Output = Result<Bookmark, BackendError>> + Send;

    /// Bookmarks together with the names of their tags (ascending).
    fn select_bookmarks(
        &mut self,
        order: Order,
    ) -> impl Future<Output = Result<Vec<Bookmark>, BackendError>> + Send;

    /// One bookmark with its tag names, `None` for unknown ids.
    fn find_bookmark(
        &mut self,
        id: BookmarkId,
    ) -> impl Future<Output = Result<Option<Bookmark>, BackendError>> + Send;

    /// Returns the number of removed bookmarks.
    fn delete_bookmark(
        &mut self,
        id: BookmarkId,
    ) -> impl Future<Output = Result<usize, BackendError>> + Send;

    fn find_tag(
        &mut self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Tag>, BackendError>> + Send;

    /// Fails with [`BackendError::DuplicationError`] when the name is taken.
    fn insert_tag(&mut self, name: &str)
        -> impl Future<Output = Result<Tag, BackendError>> + Send;

    fn select_tags(&mut self) -> impl Future<Output = Result<Vec<Tag>, BackendError>> + Send;

    /// Linking an already linked pair succeeds without changes.
    fn insert_association(
        &mut self,
        link: BookmarkTag,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn delete_associations(
        &mut self,
        bookmark_id: BookmarkId,
    ) -> impl Future<Output = Result<usize, BackendError>> + Send;

    /// Remote procedure bumping the visit counter, `None` for unknown ids.
    fn increment_visits(
        &mut self,
        id: BookmarkId,
    ) -> impl Future<Output = Result<Option<i32>, BackendError>> + Send;
}
