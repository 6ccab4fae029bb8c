use std::collections::BTreeSet;

use pagevault_types::{BookmarkId, BookmarkTag, TagId};
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::errors::{BackendError, Error};
use crate::resolver::resolve_tags;

/// Per-tag outcome of linking one bookmark to several tags.
///
/// `K` is whatever the caller addressed the tags by: ids or names.
#[derive(Debug)]
pub struct AssociationReport<K> {
    pub bookmark_id: BookmarkId,
    pub linked: Vec<K>,
    pub failed: Vec<(K, Error)>,
}

impl<K> AssociationReport<K> {
    fn new(bookmark_id: BookmarkId) -> Self {
        Self {
            bookmark_id,
            linked: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Keys that still need linking.
    pub fn failed_keys(&self) -> impl Iterator<Item = &K> {
        self.failed.iter().map(|(k, _)| k)
    }
}

impl AssociationReport<String> {
    pub fn into_result(self) -> Result<Vec<String>, Error> {
        if self.failed.is_empty() {
            return Ok(self.linked);
        }
        Err(Error::PartialAssociation {
            bookmark_id: self.bookmark_id,
            linked: self.linked,
            failed: self.failed.into_iter().map(|(name, _)| name).collect(),
            failed_ids: vec![],
        })
    }
}

impl AssociationReport<TagId> {
    /// Failed ids stay ids, so a retry goes back through [`associate`].
    pub fn into_result(self) -> Result<Vec<TagId>, Error> {
        if self.failed.is_empty() {
            return Ok(self.linked);
        }
        Err(Error::PartialAssociation {
            bookmark_id: self.bookmark_id,
            linked: self.linked.iter().map(ToString::to_string).collect(),
            failed: vec![],
            failed_ids: self.failed.into_iter().map(|(id, _)| id).collect(),
        })
    }
}

/// Link a bookmark to each tag id. Every tag id is attempted independently.
pub async fn associate<B: Backend>(
    backend: &mut B,
    bookmark_id: BookmarkId,
    tag_ids: &BTreeSet<TagId>,
) -> AssociationReport<TagId> {
    let mut report = AssociationReport::new(bookmark_id);
    for &tag_id in tag_ids {
        match backend
            .insert_association(BookmarkTag {
                bookmark_id,
                tag_id,
            })
            .await
        {
            Ok(()) => report.linked.push(tag_id),
            Err(e) => {
                warn!(bookmark_id, tag_id, ?e, "failed to link tag");
                report.failed.push((tag_id, e.into()));
            }
        }
    }
    debug!(?report, "associated");
    report
}

/// Resolve tag names (creating missing tags) and link them to a bookmark.
///
/// A name fails when either its resolution or its link fails; the others
/// are unaffected. Calling it again with the failed names retries only
/// those.
pub async fn link_tags<B: Backend, S: AsRef<str>>(
    backend: &mut B,
    bookmark_id: BookmarkId,
    names: &[S],
) -> AssociationReport<String> {
    let mut report = AssociationReport::new(bookmark_id);
    for (name, resolved) in resolve_tags(backend, names).await {
        let tag = match resolved {
            Ok(tag) => tag,
            Err(e) => {
                warn!(bookmark_id, %name, ?e, "failed to resolve tag");
                report.failed.push((name, e));
                continue;
            }
        };
        match backend
            .insert_association(BookmarkTag {
                bookmark_id,
                tag_id: tag.id,
            })
            .await
        {
            Ok(()) => report.linked.push(name),
            Err(e) => {
                warn!(bookmark_id, %name, ?e, "failed to link tag");
                report.failed.push((name, e.into()));
            }
        }
    }
    report
}

pub async fn dissociate_all<B: Backend>(
    backend: &mut B,
    bookmark_id: BookmarkId,
) -> Result<usize, BackendError> {
    let removed = backend.delete_associations(bookmark_id).await?;
    debug!(bookmark_id, removed, "dissociated");
    Ok(removed)
}
