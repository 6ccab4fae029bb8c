use std::collections::BTreeSet;

use pagevault_core::{aggregate, associate, link, Backend, Error as CoreError, Submission};
use pagevault_types::{Bookmark, BookmarkId, CreateBookmark, TagId};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket_db_pools::Connection;
use tracing::{debug, info};
use utoipa::ToSchema;

use super::errors::{Error, PartialLinks};
use super::fairings::db::Db;
use super::guards;
use crate::db::PgBackend;

#[derive(Serialize, Deserialize, ToSchema, Debug, Default)]
#[serde(crate = "rocket::serde")]
pub struct SubmitBookmark {
    pub title: String,
    pub url: String,
    /// Tag names, created when missing.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ids of existing tags picked by the user.
    #[serde(default)]
    pub tag_ids: BTreeSet<TagId>,
}

/// A bookmark of the grouped view with the icon of its site.
#[derive(Serialize, Deserialize, ToSchema, Debug, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct BookmarkEntry {
    #[serde(flatten)]
    pub bookmark: Bookmark,
    pub favicon: Option<String>,
}

impl From<Bookmark> for BookmarkEntry {
    fn from(bookmark: Bookmark) -> Self {
        let favicon = link::favicon_url(&bookmark.url);
        Self { bookmark, favicon }
    }
}

/// One bucket of the grouped view.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(crate = "rocket::serde")]
pub struct BookmarkGroup {
    pub name: String,
    pub untagged: bool,
    pub bookmarks: Vec<BookmarkEntry>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Default)]
#[serde(crate = "rocket::serde")]
pub struct LinkTags {
    /// Tag names, created when missing.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ids of existing tags.
    #[serde(default)]
    pub tag_ids: BTreeSet<TagId>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(crate = "rocket::serde")]
pub struct Visits {
    pub visits: i32,
}

/// Create a new bookmark
#[utoipa::path(
    post,
    path = "/api/bookmarks",
    request_body = SubmitBookmark,
    responses(
        (status = 200, description = "Bookmark created with every tag linked", body = Bookmark),
        (status = 207, description = "Bookmark created, some tags not linked", body = PartialLinks),
        (status = 400, description = "Missing title, missing or invalid url")
    )
)]
#[post("/", format = "application/json", data = "<payload>")]
pub async fn create_bookmark(
    mut db: Connection<Db>,
    _required: guards::Auth,
    payload: Json<SubmitBookmark>,
) -> Result<Json<Bookmark>, Error> {
    let payload = payload.into_inner();
    let draft = CreateBookmark {
        title: payload.title,
        url: payload.url,
        tags: payload.tags,
    };
    let mut backend = PgBackend::new(&mut db);
    let submission = pagevault_core::add_bookmark(&mut backend, &draft, &payload.tag_ids).await?;
    if submission.is_complete() {
        return Ok(Json(submission.bookmark));
    }

    let Submission {
        bookmark,
        selected,
        named,
    } = submission;
    let failed = named.failed_keys().cloned().collect::<Vec<_>>();
    let mut linked = named.linked;
    linked.extend(selected.linked.iter().map(ToString::to_string));
    let failed_ids = selected.failed_keys().copied().collect::<Vec<_>>();
    info!(id = bookmark.id, ?failed, ?failed_ids, "bookmark created with missing links");
    Err(CoreError::PartialAssociation {
        bookmark_id: bookmark.id,
        linked,
        failed,
        failed_ids,
    }
    .into())
}

/// List bookmarks grouped by tag
///
/// Bookmarks without tags come first, in the group named "untagged". Inside a
/// group the newest bookmark comes first.
#[utoipa::path(
    get,
    path = "/api/bookmarks",
    responses(
        (status = 200, description = "Grouped bookmarks", body = Vec<BookmarkGroup>)
    )
)]
#[get("/")]
pub async fn list_bookmarks(
    mut db: Connection<Db>,
    _required: guards::Auth,
) -> Result<Json<Vec<BookmarkGroup>>, Error> {
    let mut backend = PgBackend::new(&mut db);
    let rv = pagevault_core::list_bookmarks(&mut backend).await?;
    let groups = aggregate(&rv)
        .into_iter()
        .map(|(bucket, bookmarks)| BookmarkGroup {
            name: bucket.name().to_string(),
            untagged: bucket.is_untagged(),
            bookmarks: bookmarks.into_iter().map(BookmarkEntry::from).collect(),
        })
        .collect::<Vec<_>>();
    debug!(groups = groups.len(), "bookmarks grouped");
    Ok(Json(groups))
}

/// Delete a bookmark
#[utoipa::path(
    delete,
    path = "/api/bookmarks/{id}",
    params(
        ("id" = i32, Path, description = "The bookmark id to be deleted")
    ),
    responses(
        (status = 200, description = "Bookmark deleted success"),
        (status = 404, description = "Bookmark not found")
    )
)]
#[delete("/<id>")]
pub async fn delete_bookmark(
    mut db: Connection<Db>,
    _required: guards::Auth,
    id: BookmarkId,
) -> Result<&'static str, Error> {
    let mut backend = PgBackend::new(&mut db);
    if pagevault_core::delete_bookmark(&mut backend, id).await? {
        Ok("Deleted")
    } else {
        Err(Error::NotFound("Bookmark not found".to_string()))
    }
}

/// Count a visit of a bookmark
#[utoipa::path(
    post,
    path = "/api/bookmarks/{id}/visits",
    params(
        ("id" = i32, Path, description = "The visited bookmark id")
    ),
    responses(
        (status = 200, description = "Visit counted", body = Visits),
        (status = 404, description = "Bookmark not found")
    )
)]
#[post("/<id>/visits")]
pub async fn visit_bookmark(
    mut db: Connection<Db>,
    _required: guards::Auth,
    id: BookmarkId,
) -> Result<Json<Visits>, Error> {
    let mut backend = PgBackend::new(&mut db);
    match backend.increment_visits(id).await? {
        Some(visits) => Ok(Json(Visits { visits })),
        None => Err(Error::NotFound("Bookmark not found".to_string())),
    }
}

/// Link tags to an existing bookmark
///
/// Used to retry the tags reported as failed by a 207 response: `failed` goes
/// back in `tags`, `failed_ids` in `tag_ids`. Linking an already linked tag is
/// a no-op.
#[utoipa::path(
    post,
    path = "/api/bookmarks/{id}/tags",
    params(
        ("id" = i32, Path, description = "The bookmark id")
    ),
    request_body = LinkTags,
    responses(
        (status = 200, description = "Every tag linked", body = Vec<String>),
        (status = 207, description = "Some tags not linked", body = PartialLinks),
        (status = 404, description = "Bookmark not found")
    )
)]
#[post("/<id>/tags", format = "application/json", data = "<payload>")]
pub async fn link_tags(
    mut db: Connection<Db>,
    _required: guards::Auth,
    id: BookmarkId,
    payload: Json<LinkTags>,
) -> Result<Json<Vec<String>>, Error> {
    let mut backend = PgBackend::new(&mut db);
    if backend.find_bookmark(id).await?.is_none() {
        return Err(Error::NotFound("Bookmark not found".to_string()));
    }

    let selected = associate(&mut backend, id, &payload.tag_ids).await;
    let named = pagevault_core::link_tags(&mut backend, id, payload.tags.as_slice()).await;
    let mut linked = named.linked.clone();
    linked.extend(selected.linked.iter().map(ToString::to_string));
    if selected.is_complete() && named.is_complete() {
        return Ok(Json(linked));
    }
    Err(CoreError::PartialAssociation {
        bookmark_id: id,
        linked,
        failed: named.failed_keys().cloned().collect(),
        failed_ids: selected.failed_keys().copied().collect(),
    }
    .into())
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        create_bookmark,
        list_bookmarks,
        delete_bookmark,
        visit_bookmark,
        link_tags
    ]
}

pub(crate) mod misc {
    use super::*;

    use utoipa::OpenApi;

    #[derive(OpenApi)]
    #[openapi(
        info(title = "Bookmarks API", description = "Bookmarks API", version = "1.0"),
        paths(
            create_bookmark,
            list_bookmarks,
            delete_bookmark,
            visit_bookmark,
            link_tags
        ),
        components(schemas(
            SubmitBookmark,
            Bookmark,
            BookmarkEntry,
            BookmarkGroup,
            LinkTags,
            Visits,
            PartialLinks
        ))
    )]
    pub struct ApiDoc;
}
