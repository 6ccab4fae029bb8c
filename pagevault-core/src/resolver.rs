use itertools::Itertools;
use pagevault_types::{Tag, TagId};
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::errors::{BackendError, Error, ValidationError};

/// Tag names are stored trimmed and lowercased.
pub fn normalize_tag(name: &str) -> Result<String, ValidationError> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return Err(ValidationError::EmptyTag);
    }
    Ok(name)
}

/// Find the tag named `name` (after normalization), creating it if missing.
pub async fn get_or_create_tag<B: Backend>(backend: &mut B, name: &str) -> Result<Tag, Error> {
    let name = normalize_tag(name)?;

    if let Some(tag) = backend.find_tag(&name).await? {
        debug!(?tag, "tag found");
        return Ok(tag);
    }

    match backend.insert_tag(&name).await {
        Ok(tag) => {
            debug!(?tag, "tag created");
            Ok(tag)
        }
        // another writer created it after our lookup
        Err(BackendError::DuplicationError { .. }) => {
            warn!(%name, "tag created concurrently, reloading");
            backend.find_tag(&name).await?.ok_or_else(|| {
                BackendError::Unavailable(format!("tag {name:?} vanished after a conflict")).into()
            })
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn resolve_tag<B: Backend>(backend: &mut B, name: &str) -> Result<TagId, Error> {
    get_or_create_tag(backend, name).await.map(|tag| tag.id)
}

/// Resolve every distinct normalized name, in first-seen order.
///
/// Each name gets its own outcome. Names that normalize to nothing are
/// reported with their raw spelling.
pub async fn resolve_tags<B: Backend, S: AsRef<str>>(
    backend: &mut B,
    names: &[S],
) -> Vec<(String, Result<Tag, Error>)> {
    let names = names
        .iter()
        .map(|name| match normalize_tag(name.as_ref()) {
            Ok(normalized) => (normalized, true),
            Err(_) => (name.as_ref().to_string(), false),
        })
        .unique()
        .collect_vec();

    let mut rv = Vec::with_capacity(names.len());
    for (name, valid) in names {
        let outcome = if valid {
            get_or_create_tag(backend, &name).await
        } else {
            Err(ValidationError::EmptyTag.into())
        };
        rv.push((name, outcome));
    }
    rv
}
