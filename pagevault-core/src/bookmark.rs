use std::collections::BTreeSet;

use pagevault_types::{Bookmark, BookmarkId, CreateBookmark, NewBookmark, TagId};
use tracing::{debug, error, info, warn};

use crate::association::{associate, dissociate_all, link_tags, AssociationReport};
use crate::backend::{Backend, Order};
use crate::errors::{Error, ValidationError};
use crate::link;

/// Check a draft locally and turn it into an insert payload.
pub fn validate(draft: &CreateBookmark) -> Result<NewBookmark, ValidationError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    let url = link::validate_url(&draft.url)?;
    Ok(NewBookmark {
        title: title.to_string(),
        url: url.to_string(),
    })
}

/// Outcome of adding a bookmark: the bookmark always exists, its links may
/// be incomplete.
#[derive(Debug)]
pub struct Submission {
    pub bookmark: Bookmark,
    /// Links to the selected tag ids.
    pub selected: AssociationReport<TagId>,
    /// Links to the tag names typed into the draft.
    pub named: AssociationReport<String>,
}

impl Submission {
    pub fn is_complete(&self) -> bool {
        self.selected.is_complete() && self.named.is_complete()
    }
}

/// Create a bookmark and link it to the selected tags and to the draft's tag
/// names.
///
/// Fails without side effects on validation errors, and without links when
/// the bookmark itself cannot be inserted.
pub async fn add_bookmark<B: Backend>(
    backend: &mut B,
    draft: &CreateBookmark,
    selected: &BTreeSet<TagId>,
) -> Result<Submission, Error> {
    let new = validate(draft)?;
    let mut bookmark = backend.insert_bookmark(&new).await?;
    info!(id = bookmark.id, url = %bookmark.url, "bookmark created");

    let selected = associate(backend, bookmark.id, selected).await;
    let named = link_tags(backend, bookmark.id, draft.tags.as_slice()).await;

    // the freshly inserted record carries no tags yet
    match backend.find_bookmark(bookmark.id).await {
        Ok(Some(found)) => bookmark.tags = found.tags,
        Ok(None) => warn!(id = bookmark.id, "bookmark gone before reading its tags"),
        Err(e) => warn!(id = bookmark.id, ?e, "failed to read back bookmark tags"),
    }

    Ok(Submission {
        bookmark,
        selected,
        named,
    })
}

/// Newest first, each with its tag names.
pub async fn list_bookmarks<B: Backend>(backend: &mut B) -> Result<Vec<Bookmark>, Error> {
    let rv = backend.select_bookmarks(Order::Desc).await?;
    debug!(count = rv.len(), "bookmarks loaded");
    Ok(rv)
}

/// Remove the bookmark and its tag links. Returns false for unknown ids.
pub async fn delete_bookmark<B: Backend>(
    backend: &mut B,
    id: BookmarkId,
) -> Result<bool, Error> {
    dissociate_all(backend, id).await?;
    let deleted = backend.delete_bookmark(id).await? > 0;
    info!(id, deleted, "bookmark deleted");
    Ok(deleted)
}

/// Bump the visit counter. Failures are logged and swallowed.
pub async fn record_visit<B: Backend>(backend: &mut B, id: BookmarkId) -> Option<i32> {
    match backend.increment_visits(id).await {
        Ok(visits) => {
            debug!(id, ?visits, "visit recorded");
            visits
        }
        Err(e) => {
            error!(id, ?e, "failed to increment visits");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::errors::BackendError;
    use crate::resolver::resolve_tag;

    fn draft(title: &str, url: &str, tags: &[&str]) -> CreateBookmark {
        CreateBookmark {
            title: title.to_string(),
            url: url.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_validate() {
        let rv = validate(&draft("  Rust ", " https://www.rust-lang.org ", &[])).unwrap();
        assert_eq!(rv.title, "Rust");
        assert_eq!(rv.url, "https://www.rust-lang.org");

        assert_eq!(
            validate(&draft(" ", "https://www.rust-lang.org", &[])),
            Err(ValidationError::MissingTitle)
        );
        assert_eq!(
            validate(&draft("Rust", "", &[])),
            Err(ValidationError::MissingUrl)
        );
        assert!(matches!(
            validate(&draft("Rust", "rust-lang", &[])),
            Err(ValidationError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_backend() {
        let mut backend = MemoryBackend::new();
        let rv = add_bookmark(&mut backend, &draft("", "", &["a"]), &BTreeSet::new()).await;
        assert!(matches!(rv, Err(Error::Validation(_))));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn add_with_selected_and_named_tags() {
        let mut backend = MemoryBackend::new();
        let work = resolve_tag(&mut backend, "work").await.unwrap();

        let rv = add_bookmark(
            &mut backend,
            &draft("Rust", "https://www.rust-lang.org", &["Lang", "work"]),
            &BTreeSet::from([work]),
        )
        .await
        .unwrap();
        assert!(rv.is_complete());
        assert_eq!(rv.bookmark.tags, vec!["lang", "work"]);
        assert_eq!(backend.select_tags().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_read_back_keeps_the_bookmark() {
        let mut backend = MemoryBackend::new();
        backend.fail_op("find_bookmark");
        let rv = add_bookmark(
            &mut backend,
            &draft("Rust", "https://www.rust-lang.org", &["lang"]),
            &BTreeSet::new(),
        )
        .await
        .unwrap();
        assert!(rv.is_complete());
        assert!(rv.bookmark.tags.is_empty());
        // the links exist even though the returned record lacks them
        assert_eq!(backend.links().len(), 1);
        let listed = list_bookmarks(&mut backend).await.unwrap();
        assert_eq!(listed[0].tags, vec!["lang"]);
    }

    #[tokio::test]
    async fn insert_failure_is_abandoned() {
        let mut backend = MemoryBackend::new();
        backend.set_offline(true);
        let rv = add_bookmark(
            &mut backend,
            &draft("Rust", "https://www.rust-lang.org", &["a"]),
            &BTreeSet::new(),
        )
        .await;
        assert!(matches!(
            rv,
            Err(Error::Backend(BackendError::Unavailable(_)))
        ));
        // only the insert was attempted
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn delete_cascades() {
        let mut backend = MemoryBackend::new();
        let rv = add_bookmark(
            &mut backend,
            &draft("Rust", "https://www.rust-lang.org", &["a", "b"]),
            &BTreeSet::new(),
        )
        .await
        .unwrap();
        assert_eq!(backend.links().len(), 2);

        assert!(delete_bookmark(&mut backend, rv.bookmark.id).await.unwrap());
        assert!(backend.links().is_empty());
        assert!(list_bookmarks(&mut backend).await.unwrap().is_empty());
        assert!(!delete_bookmark(&mut backend, rv.bookmark.id).await.unwrap());
    }

    #[tokio::test]
    async fn visit_errors_are_swallowed() {
        let mut backend = MemoryBackend::new();
        let rv = add_bookmark(
            &mut backend,
            &draft("Rust", "https://www.rust-lang.org", &[]),
            &BTreeSet::new(),
        )
        .await
        .unwrap();
        assert_eq!(record_visit(&mut backend, rv.bookmark.id).await, Some(1));

        backend.set_offline(true);
        assert_eq!(record_visit(&mut backend, rv.bookmark.id).await, None);
    }
}
