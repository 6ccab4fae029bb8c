//! State handed to the presentation layer.
//!
//! A [`Shelf`] owns the backend handle, the tag selection of the bookmark
//! being composed and the last loaded view. Renderers read from it; user
//! actions go through its methods.

use pagevault_types::{Bookmark, BookmarkId, CreateBookmark, Tag, TagId};
use tracing::{info, warn};

use crate::aggregate::{aggregate, Buckets};
use crate::association::{associate, link_tags};
use crate::backend::Backend;
use crate::bookmark::{self, Submission};
use crate::errors::Error;
use crate::router::Route;
use crate::selection::SelectionState;

#[derive(Debug)]
pub struct Shelf<B> {
    backend: B,
    selection: SelectionState,
    bookmarks: Vec<Bookmark>,
    buckets: Buckets,
    tags: Vec<Tag>,
}

impl<B: Backend> Shelf<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            selection: SelectionState::new(),
            bookmarks: Vec::new(),
            buckets: Buckets::new(),
            tags: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Reload bookmarks and tags, then regroup.
    pub async fn load(&mut self) -> Result<&Buckets, Error> {
        let bookmarks = bookmark::list_bookmarks(&mut self.backend).await?;
        let tags = self.backend.select_tags().await?;
        self.buckets = aggregate(&bookmarks);
        self.bookmarks = bookmarks;
        self.tags = tags;
        Ok(&self.buckets)
    }

    async fn refresh(&mut self) {
        if let Err(e) = self.load().await {
            warn!(?e, "failed to reload bookmarks, keeping the previous view");
        }
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn toggle_tag(&mut self, tag_id: TagId) -> bool {
        self.selection.toggle(tag_id)
    }

    fn tag_label(&self, tag_id: TagId) -> String {
        self.tags
            .iter()
            .find(|t| t.id == tag_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| tag_id.to_string())
    }

    /// Add the drafted bookmark with the selected tags and the draft's tag
    /// names.
    ///
    /// The selection is cleared only when every link was created. When some
    /// links fail the bookmark still exists and
    /// [`Error::PartialAssociation`] carries the missing tags, ready for
    /// [`Shelf::retry_links`]: selected tags by id, draft tags by name.
    pub async fn submit(&mut self, draft: CreateBookmark) -> Result<Bookmark, Error> {
        let selected = self.selection.snapshot();
        let submission = bookmark::add_bookmark(&mut self.backend, &draft, &selected).await?;
        let complete = submission.is_complete();
        let Submission {
            bookmark,
            selected,
            named,
        } = submission;

        if complete {
            self.selection.clear();
            self.refresh().await;
            return Ok(bookmark);
        }

        let linked = selected
            .linked
            .iter()
            .map(|id| self.tag_label(*id))
            .chain(named.linked.iter().cloned())
            .collect();
        let failed = named.failed_keys().cloned().collect();
        let failed_ids = selected.failed_keys().copied().collect();
        self.refresh().await;
        Err(Error::PartialAssociation {
            bookmark_id: bookmark.id,
            linked,
            failed,
            failed_ids,
        })
    }

    /// Link existing tags by id and tag names to a bookmark, usually the
    /// `failed_ids` and `failed` of a previous submission.
    pub async fn retry_links(
        &mut self,
        bookmark_id: BookmarkId,
        tag_ids: &[TagId],
        names: &[String],
    ) -> Result<(), Error> {
        let tag_ids = tag_ids.iter().copied().collect();
        let selected = associate(&mut self.backend, bookmark_id, &tag_ids).await;
        let named = link_tags(&mut self.backend, bookmark_id, names).await;
        let complete = selected.is_complete() && named.is_complete();
        if complete {
            self.selection.clear();
        }
        self.refresh().await;
        if complete {
            return Ok(());
        }
        Err(Error::PartialAssociation {
            bookmark_id,
            linked: selected
                .linked
                .iter()
                .map(|id| self.tag_label(*id))
                .chain(named.linked.iter().cloned())
                .collect(),
            failed: named.failed_keys().cloned().collect(),
            failed_ids: selected.failed_keys().copied().collect(),
        })
    }

    pub async fn delete(&mut self, id: BookmarkId) -> Result<bool, Error> {
        let deleted = bookmark::delete_bookmark(&mut self.backend, id).await?;
        self.refresh().await;
        Ok(deleted)
    }

    /// Count a visit. Never fails; errors are only logged.
    pub async fn visit(&mut self, id: BookmarkId) {
        let Some(visits) = bookmark::record_visit(&mut self.backend, id).await else {
            return;
        };
        if let Some(b) = self.bookmarks.iter_mut().find(|b| b.id == id) {
            b.visits = visits;
            self.buckets = aggregate(&self.bookmarks);
        }
    }

    /// Drop the composition state.
    pub fn reset(&mut self) {
        self.selection.clear();
    }

    /// Follow a navigation. Leaving the bookmark list resets the composer.
    pub fn on_route(&mut self, route: &Route) {
        if !matches!(route, Route::Bookmarks) {
            info!(?route, "left bookmarks, resetting selection");
            self.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Bucket;
    use crate::backend::MemoryBackend;
    use crate::errors::{BackendError, ValidationError};

    fn draft(title: &str, tags: &[&str]) -> CreateBookmark {
        CreateBookmark {
            title: title.to_string(),
            url: format!("https://{}.example.com", title.to_lowercase()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn ids(shelf: &Shelf<MemoryBackend>, key: Bucket) -> Vec<BookmarkId> {
        shelf
            .buckets()
            .get(&key)
            .map(|lst| lst.iter().map(|b| b.id).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn empty_shelf() {
        let mut shelf = Shelf::new(MemoryBackend::new());
        assert!(shelf.load().await.unwrap().is_empty());
        assert!(shelf.tags().is_empty());
    }

    #[tokio::test]
    async fn submit_groups_and_clears_selection() {
        let mut shelf = Shelf::new(MemoryBackend::new());
        let first = shelf.submit(draft("One", &[])).await.unwrap();
        let second = shelf.submit(draft("Two", &["News"])).await.unwrap();

        let news = shelf.tags()[0].id;
        assert!(shelf.toggle_tag(news));
        let third = shelf.submit(draft("Three", &["tech"])).await.unwrap();
        assert!(shelf.selection().is_empty());

        assert_eq!(ids(&shelf, Bucket::Untagged), vec![first.id]);
        assert_eq!(ids(&shelf, "news".into()), vec![third.id, second.id]);
        assert_eq!(ids(&shelf, "tech".into()), vec![third.id]);
        assert_eq!(third.tags, vec!["news", "tech"]);
    }

    #[tokio::test]
    async fn validation_keeps_state() {
        let mut shelf = Shelf::new(MemoryBackend::new());
        shelf.submit(draft("Tagged", &["a"])).await.unwrap();
        let a = shelf.tags()[0].id;
        shelf.toggle_tag(a);

        let rv = shelf
            .submit(CreateBookmark {
                title: "No url".to_string(),
                ..Default::default()
            })
            .await;
        assert!(matches!(
            rv,
            Err(Error::Validation(ValidationError::MissingUrl))
        ));
        assert!(shelf.selection().is_selected(a));
        assert_eq!(shelf.bookmarks().len(), 1);
    }

    #[tokio::test]
    async fn partial_failure_then_retry() {
        let mut shelf = Shelf::new(MemoryBackend::new());
        shelf.submit(draft("Seed", &["a"])).await.unwrap();
        let a = shelf.tags()[0].id;
        shelf.toggle_tag(a);
        shelf.backend_mut().reject_tag("b");

        let (bookmark_id, failed) = match shelf.submit(draft("Rust", &["B"])).await {
            Err(Error::PartialAssociation {
                bookmark_id,
                linked,
                failed,
                failed_ids,
            }) => {
                assert_eq!(linked, vec!["a"]);
                assert_eq!(failed, vec!["b"]);
                assert!(failed_ids.is_empty());
                (bookmark_id, failed)
            }
            rv => panic!("unexpected result: {rv:?}"),
        };
        // the bookmark exists and the selection survives for the retry
        assert!(shelf.bookmarks().iter().any(|b| b.id == bookmark_id));
        assert!(shelf.selection().is_selected(a));

        shelf.backend_mut().accept_tag("b");
        shelf.retry_links(bookmark_id, &[], &failed).await.unwrap();
        assert!(shelf.selection().is_empty());
        let rv = shelf.bookmarks().iter().find(|b| b.id == bookmark_id).unwrap();
        assert_eq!(rv.tags, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn unknown_selected_tag_is_retried_by_id() {
        let mut shelf = Shelf::new(MemoryBackend::new());
        shelf.toggle_tag(42);

        let (bookmark_id, failed, failed_ids) = match shelf.submit(draft("Tokio", &[])).await {
            Err(Error::PartialAssociation {
                bookmark_id,
                failed,
                failed_ids,
                ..
            }) => (bookmark_id, failed, failed_ids),
            rv => panic!("unexpected result: {rv:?}"),
        };
        assert!(failed.is_empty());
        assert_eq!(failed_ids, vec![42]);

        // the id is never resolved as a tag name
        let rv = shelf.retry_links(bookmark_id, &failed_ids, &failed).await;
        assert!(matches!(
            rv,
            Err(Error::PartialAssociation { ref failed_ids, .. }) if failed_ids == &[42]
        ));
        assert!(shelf.tags().is_empty());
        assert!(shelf.selection().is_selected(42));
        assert!(shelf.bookmarks()[0].tags.is_empty());
    }

    #[tokio::test]
    async fn delete_and_visit() {
        let mut shelf = Shelf::new(MemoryBackend::new());
        let bm = shelf.submit(draft("Rust", &["lang"])).await.unwrap();

        shelf.visit(bm.id).await;
        shelf.visit(bm.id).await;
        assert_eq!(shelf.bookmarks()[0].visits, 2);
        assert_eq!(shelf.buckets()[&Bucket::from("lang")][0].visits, 2);

        shelf.backend_mut().set_offline(true);
        shelf.visit(bm.id).await;
        assert_eq!(shelf.bookmarks()[0].visits, 2);
        assert!(matches!(
            shelf.delete(bm.id).await,
            Err(Error::Backend(BackendError::Unavailable(_)))
        ));

        shelf.backend_mut().set_offline(false);
        assert!(shelf.delete(bm.id).await.unwrap());
        assert!(shelf.buckets().is_empty());
        assert!(shelf.backend().links().is_empty());
    }

    #[tokio::test]
    async fn leaving_bookmarks_resets_selection() {
        let mut shelf = Shelf::new(MemoryBackend::new());
        shelf.toggle_tag(1);
        shelf.on_route(&Route::Bookmarks);
        assert!(!shelf.selection().is_empty());
        shelf.on_route(&Route::SignIn);
        assert!(shelf.selection().is_empty());
    }
}
