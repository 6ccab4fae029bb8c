use thiserror::Error;

use pagevault_types::{BookmarkId, TagId};

/// Rejected before anything reaches the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("bookmark title is required")]
    MissingTitle,
    #[error("bookmark url is required")]
    MissingUrl,
    #[error("invalid absolute url: {0:?}")]
    InvalidUrl(String),
    #[error("Empty tag name error")]
    EmptyTag,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("duplicate key value violates unique constraint of {table:?}")]
    DuplicationError { table: String },
    #[error("foreign key constraint violation")]
    ViolationError(),
    #[error("{table} record {id} not found")]
    NotFound { table: String, id: i32 },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The bookmark exists, but some of its tag links are missing.
    ///
    /// Tags addressed by name fail into `failed`, tags addressed by id into
    /// `failed_ids`. The two are retried through different paths.
    #[error("bookmark {bookmark_id} could not be linked to {}", describe_failed(.failed, .failed_ids))]
    PartialAssociation {
        bookmark_id: BookmarkId,
        linked: Vec<String>,
        failed: Vec<String>,
        failed_ids: Vec<TagId>,
    },
}

fn describe_failed(names: &[String], ids: &[TagId]) -> String {
    names
        .iter()
        .cloned()
        .chain(ids.iter().map(|id| format!("tag #{id}")))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_association_lists_failed_tags() {
        let e = Error::PartialAssociation {
            bookmark_id: 7,
            linked: vec!["a".to_string()],
            failed: vec!["b".to_string(), "c".to_string()],
            failed_ids: vec![],
        };
        assert_eq!(e.to_string(), "bookmark 7 could not be linked to b, c");

        let e = Error::PartialAssociation {
            bookmark_id: 7,
            linked: vec![],
            failed: vec!["b".to_string()],
            failed_ids: vec![42],
        };
        assert_eq!(e.to_string(), "bookmark 7 could not be linked to b, tag #42");
    }

    #[test]
    fn transparent_sources() {
        let e: Error = BackendError::Unavailable("offline".to_string()).into();
        assert_eq!(e.to_string(), "backend unavailable: offline");
        let e: Error = ValidationError::MissingTitle.into();
        assert!(matches!(e, Error::Validation(ValidationError::MissingTitle)));
    }
}
