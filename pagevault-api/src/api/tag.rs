use pagevault_core::Backend;
use pagevault_types::{ResolveTag, Tag};
use rocket::serde::json::Json;
use rocket_db_pools::Connection;

use super::errors::Error;
use super::fairings::db::Db;
use super::guards;
use crate::db::PgBackend;

/// List every tag by name
#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "All tags", body = Vec<Tag>)
    )
)]
#[get("/")]
pub async fn list_tags(mut db: Connection<Db>, _required: guards::Auth) -> Result<Json<Vec<Tag>>, Error> {
    let mut backend = PgBackend::new(&mut db);
    Ok(Json(backend.select_tags().await?))
}

/// Find a tag by name, creating it when missing
#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = ResolveTag,
    responses(
        (status = 200, description = "The existing or created tag", body = Tag),
        (status = 400, description = "Empty tag name")
    )
)]
#[post("/", format = "application/json", data = "<payload>")]
pub async fn resolve_tag(
    mut db: Connection<Db>,
    _required: guards::Auth,
    payload: Json<ResolveTag>,
) -> Result<Json<Tag>, Error> {
    let mut backend = PgBackend::new(&mut db);
    let tag = pagevault_core::get_or_create_tag(&mut backend, &payload.name).await?;
    Ok(Json(tag))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![list_tags, resolve_tag]
}

pub(crate) mod misc {
    use super::*;

    use utoipa::OpenApi;

    #[derive(OpenApi)]
    #[openapi(
        info(title = "Tags API", description = "Tags API", version = "1.0"),
        paths(list_tags, resolve_tag),
        components(schemas(Tag, ResolveTag))
    )]
    pub struct ApiDoc;
}
