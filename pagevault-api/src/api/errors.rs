use pagevault_core::{BackendError, Error as CoreError, ValidationError};
use pagevault_types::{BookmarkId, TagId};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

/// Body of a 207 response: the bookmark was stored, some tags were not linked.
#[derive(Serialize, Deserialize, ToSchema, Debug, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct PartialLinks {
    pub bookmark_id: BookmarkId,
    pub linked: Vec<String>,
    /// Tag names to send again in `tags`.
    pub failed: Vec<String>,
    /// Tag ids to send again in `tag_ids`.
    pub failed_ids: Vec<TagId>,
}

#[derive(Responder, Debug)]
pub enum Error {
    #[response(status = 404)]
    NotFound(String),
    #[response(status = 400)]
    BadRequest(String),
    #[response(status = 401)]
    MissingAPIKey(String),
    #[response(status = 403)]
    InvalidAPIKey(String),
    #[response(status = 207)]
    PartialContent(Json<PartialLinks>),
    #[response(status = 500)]
    InternalServer(String),
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::BadRequest(e.to_string())
    }
}

impl From<BackendError> for Error {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::DuplicationError { table: _ } => Error::BadRequest(e.to_string()),
            BackendError::ViolationError() => Error::BadRequest(e.to_string()),
            BackendError::NotFound { .. } => Error::NotFound(e.to_string()),
            BackendError::Unavailable(_) => {
                error!(?e, "backend failure");
                Error::InternalServer("Backend unavailable".to_string())
            }
        }
    }
}

impl From<CoreError> for Error {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Validation(e) => e.into(),
            CoreError::Backend(e) => e.into(),
            CoreError::PartialAssociation {
                bookmark_id,
                linked,
                failed,
                failed_ids,
            } => Error::PartialContent(Json(PartialLinks {
                bookmark_id,
                linked,
                failed,
                failed_ids,
            })),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn core_errors_map_to_status() {
        assert!(matches!(
            Error::from(CoreError::from(ValidationError::EmptyTag)),
            Error::BadRequest(msg) if msg == "Empty tag name error"
        ));
        assert!(matches!(
            Error::from(BackendError::NotFound {
                table: "bookmarks".to_string(),
                id: 3
            }),
            Error::NotFound(_)
        ));
        assert!(matches!(
            Error::from(BackendError::Unavailable("connection reset".to_string())),
            Error::InternalServer(msg) if !msg.contains("reset")
        ));
    }

    #[test]
    fn partial_association_keeps_names() {
        let rv = Error::from(CoreError::PartialAssociation {
            bookmark_id: 7,
            linked: vec!["a".to_string()],
            failed: vec!["b".to_string()],
            failed_ids: vec![42],
        });
        let Error::PartialContent(Json(body)) = rv else {
            panic!("expected partial content");
        };
        assert_eq!(
            body,
            PartialLinks {
                bookmark_id: 7,
                linked: vec!["a".to_string()],
                failed: vec!["b".to_string()],
                failed_ids: vec![42],
            }
        );
    }
}
