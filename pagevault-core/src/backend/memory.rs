use std::collections::{BTreeMap, BTreeSet, HashSet};

use pagevault_types::{Bookmark, BookmarkId, BookmarkTag, NewBookmark, Tag, TagId};
use tracing::debug;

use super::{Backend, Order};
use crate::errors::BackendError;

#[derive(Debug, Clone)]
struct StoredBookmark {
    title: String,
    url: String,
    visits: i32,
    created_at: time::OffsetDateTime,
}

/// In-process store with the same constraints as the PostgreSQL schema:
/// unique tag names, composite association keys, cascading deletes.
///
/// Failures can be injected to exercise the error paths of the core.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    next_bookmark_id: BookmarkId,
    next_tag_id: TagId,
    bookmarks: BTreeMap<BookmarkId, StoredBookmark>,
    tags: BTreeMap<TagId, String>,
    links: BTreeSet<BookmarkTag>,

    offline: bool,
    rejected_tags: HashSet<String>,
    rejected_links: HashSet<TagId>,
    hidden_once: HashSet<String>,
    failing_ops: HashSet<String>,
    calls: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every following call fails with [`BackendError::Unavailable`].
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Creating a tag with this name fails.
    pub fn reject_tag(&mut self, name: &str) {
        self.rejected_tags.insert(name.to_string());
    }

    pub fn accept_tag(&mut self, name: &str) {
        self.rejected_tags.remove(name);
    }

    /// Linking any bookmark to this tag fails.
    pub fn reject_links_to(&mut self, tag_id: TagId) {
        self.rejected_links.insert(tag_id);
    }

    /// The next lookup of `name` misses even if the tag exists, as if a
    /// concurrent writer created it between lookup and insert.
    pub fn hide_tag_once(&mut self, name: &str) {
        self.hidden_once.insert(name.to_string());
    }

    /// Every call of the named operation fails with
    /// [`BackendError::Unavailable`].
    pub fn fail_op(&mut self, op: &str) {
        self.failing_ops.insert(op.to_string());
    }

    /// Number of backend operations served so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn links(&self) -> Vec<BookmarkTag> {
        self.links.iter().copied().collect()
    }

    fn enter(&mut self, op: &str) -> Result<(), BackendError> {
        self.calls += 1;
        debug!(op, calls = self.calls, "memory backend call");
        if self.offline {
            return Err(BackendError::Unavailable(format!("{op}: offline")));
        }
        if self.failing_ops.contains(op) {
            return Err(BackendError::Unavailable(format!("{op}: injected failure")));
        }
        Ok(())
    }

    fn tag_names_of(&self, bookmark_id: BookmarkId) -> Vec<String> {
        let mut names = self
            .links
            .range(
                BookmarkTag {
                    bookmark_id,
                    tag_id: TagId::MIN,
                }..=BookmarkTag {
                    bookmark_id,
                    tag_id: TagId::MAX,
                },
            )
            .filter_map(|link| self.tags.get(&link.tag_id).cloned())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    fn to_bookmark(&self, id: BookmarkId, stored: &StoredBookmark) -> Bookmark {
        Bookmark {
            id,
            title: stored.title.clone(),
            url: stored.url.clone(),
            visits: stored.visits,
            tags: self.tag_names_of(id),
            created_at: stored.created_at,
        }
    }
}

impl Backend for MemoryBackend {
    async fn insert_bookmark(&mut self, new: &NewBookmark) -> Result<Bookmark, BackendError> {
        self.enter("insert_bookmark")?;
        self.next_bookmark_id += 1;
        let id = self.next_bookmark_id;
        let stored = StoredBookmark {
            title: new.title.clone(),
            url: new.url.clone(),
            visits: 0,
            created_at: time::OffsetDateTime::now_utc(),
        };
        let rv = self.to_bookmark(id, &stored);
        self.bookmarks.insert(id, stored);
        Ok(rv)
    }

    async fn select_bookmarks(&mut self, order: Order) -> Result<Vec<Bookmark>, BackendError> {
        self.enter("select_bookmarks")?;
        let mut rv = self
            .bookmarks
            .iter()
            .map(|(id, stored)| self.to_bookmark(*id, stored))
            .collect::<Vec<_>>();
        rv.sort_by_key(|b| (b.created_at, b.id));
        if order == Order::Desc {
            rv.reverse();
        }
        Ok(rv)
    }

    async fn find_bookmark(&mut self, id: BookmarkId) -> Result<Option<Bookmark>, BackendError> {
        self.enter("find_bookmark")?;
        Ok(self
            .bookmarks
            .get(&id)
            .map(|stored| self.to_bookmark(id, stored)))
    }

    async fn delete_bookmark(&mut self, id: BookmarkId) -> Result<usize, BackendError> {
        self.enter("delete_bookmark")?;
        if self.bookmarks.remove(&id).is_none() {
            return Ok(0);
        }
        self.links.retain(|link| link.bookmark_id != id);
        Ok(1)
    }

    async fn find_tag(&mut self, name: &str) -> Result<Option<Tag>, BackendError> {
        self.enter("find_tag")?;
        if self.hidden_once.remove(name) {
            return Ok(None);
        }
        Ok(self
            .tags
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, n)| Tag {
                id: *id,
                name: n.clone(),
            }))
    }

    async fn insert_tag(&mut self, name: &str) -> Result<Tag, BackendError> {
        self.enter("insert_tag")?;
        if self.rejected_tags.contains(name) {
            return Err(BackendError::Unavailable(format!(
                "insert_tag: {name:?} rejected"
            )));
        }
        if self.tags.values().any(|n| n == name) {
            return Err(BackendError::DuplicationError {
                table: "tags".to_string(),
            });
        }
        self.next_tag_id += 1;
        let id = self.next_tag_id;
        self.tags.insert(id, name.to_string());
        Ok(Tag {
            id,
            name: name.to_string(),
        })
    }

    async fn select_tags(&mut self) -> Result<Vec<Tag>, BackendError> {
        self.enter("select_tags")?;
        let mut rv = self
            .tags
            .iter()
            .map(|(id, name)| Tag {
                id: *id,
                name: name.clone(),
            })
            .collect::<Vec<_>>();
        rv.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rv)
    }

    async fn insert_association(&mut self, link: BookmarkTag) -> Result<(), BackendError> {
        self.enter("insert_association")?;
        if self.rejected_links.contains(&link.tag_id) {
            return Err(BackendError::Unavailable(format!(
                "insert_association: tag {} rejected",
                link.tag_id
            )));
        }
        if !self.bookmarks.contains_key(&link.bookmark_id) || !self.tags.contains_key(&link.tag_id)
        {
            return Err(BackendError::ViolationError());
        }
        self.links.insert(link);
        Ok(())
    }

    async fn delete_associations(&mut self, bookmark_id: BookmarkId) -> Result<usize, BackendError> {
        self.enter("delete_associations")?;
        let before = self.links.len();
        self.links.retain(|link| link.bookmark_id != bookmark_id);
        Ok(before - self.links.len())
    }

    async fn increment_visits(&mut self, id: BookmarkId) -> Result<Option<i32>, BackendError> {
        self.enter("increment_visits")?;
        Ok(self.bookmarks.get_mut(&id).map(|stored| {
            stored.visits += 1;
            stored.visits
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_bookmark(title: &str) -> NewBookmark {
        NewBookmark {
            title: title.to_string(),
            url: format!("https://{title}.example.com"),
        }
    }

    #[tokio::test]
    async fn tag_names_are_unique() {
        let mut backend = MemoryBackend::new();
        let tag = backend.insert_tag("rust").await.unwrap();
        assert!(tag.id > 0);

        let rv = backend.insert_tag("rust").await;
        assert!(matches!(rv, Err(BackendError::DuplicationError { .. })));
    }

    #[tokio::test]
    async fn association_requires_both_records() {
        let mut backend = MemoryBackend::new();
        let bm = backend.insert_bookmark(&new_bookmark("a")).await.unwrap();

        let rv = backend
            .insert_association(BookmarkTag {
                bookmark_id: bm.id,
                tag_id: 42,
            })
            .await;
        assert_eq!(rv, Err(BackendError::ViolationError()));
    }

    #[tokio::test]
    async fn deleting_bookmark_cascades_to_links() {
        let mut backend = MemoryBackend::new();
        let bm = backend.insert_bookmark(&new_bookmark("a")).await.unwrap();
        let tag = backend.insert_tag("news").await.unwrap();
        let link = BookmarkTag {
            bookmark_id: bm.id,
            tag_id: tag.id,
        };
        backend.insert_association(link).await.unwrap();
        backend.insert_association(link).await.unwrap();
        assert_eq!(backend.links(), vec![link]);

        assert_eq!(backend.delete_bookmark(bm.id).await.unwrap(), 1);
        assert!(backend.links().is_empty());
        assert_eq!(backend.delete_bookmark(bm.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn select_bookmarks_ordering_and_tags() {
        let mut backend = MemoryBackend::new();
        let first = backend.insert_bookmark(&new_bookmark("a")).await.unwrap();
        let second = backend.insert_bookmark(&new_bookmark("b")).await.unwrap();
        for name in ["tech", "news"] {
            let tag = backend.insert_tag(name).await.unwrap();
            backend
                .insert_association(BookmarkTag {
                    bookmark_id: second.id,
                    tag_id: tag.id,
                })
                .await
                .unwrap();
        }

        let rv = backend.select_bookmarks(Order::Desc).await.unwrap();
        assert_eq!(rv.iter().map(|b| b.id).collect::<Vec<_>>(), vec![second.id, first.id]);
        assert_eq!(rv[0].tags, vec!["news", "tech"]);
        assert!(rv[1].tags.is_empty());

        let rv = backend.select_bookmarks(Order::Asc).await.unwrap();
        assert_eq!(rv[0].id, first.id);
    }

    #[tokio::test]
    async fn find_single_bookmark() {
        let mut backend = MemoryBackend::new();
        let bm = backend.insert_bookmark(&new_bookmark("a")).await.unwrap();
        let tag = backend.insert_tag("news").await.unwrap();
        backend
            .insert_association(BookmarkTag {
                bookmark_id: bm.id,
                tag_id: tag.id,
            })
            .await
            .unwrap();

        let rv = backend.find_bookmark(bm.id).await.unwrap().unwrap();
        assert_eq!(rv.title, "a");
        assert_eq!(rv.tags, vec!["news"]);
        assert_eq!(backend.find_bookmark(-1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn increment_visits_of_known_and_unknown() {
        let mut backend = MemoryBackend::new();
        let bm = backend.insert_bookmark(&new_bookmark("a")).await.unwrap();
        assert_eq!(backend.increment_visits(bm.id).await.unwrap(), Some(1));
        assert_eq!(backend.increment_visits(bm.id).await.unwrap(), Some(2));
        assert_eq!(backend.increment_visits(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn offline_fails_every_call() {
        let mut backend = MemoryBackend::new();
        backend.set_offline(true);
        assert!(matches!(
            backend.select_tags().await,
            Err(BackendError::Unavailable(_))
        ));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn injected_failure_hits_one_operation() {
        let mut backend = MemoryBackend::new();
        backend.fail_op("select_tags");
        assert!(matches!(
            backend.select_tags().await,
            Err(BackendError::Unavailable(_))
        ));
        assert!(backend.find_tag("rust").await.unwrap().is_none());
    }
}
