#[macro_use]
extern crate rocket;

pub mod api;
pub mod db;
pub mod utils;

#[cfg(test)]
#[cfg(not(tarpaulin_include))]
#[ctor::ctor]
fn init() {
    crate::utils::logging::setup_console_log();
}

pub(crate) mod misc {
    use utoipa::OpenApi;
    use utoipa_rapidoc::RapiDoc;
    use utoipa_swagger_ui::SwaggerUi;
    use utoipa_swagger_ui::Url;

    #[derive(OpenApi)]
    #[openapi(info(
        title = "Pagevault API",
        description = r"## Main API documentation

- [Bookmarks API](/swagger-ui/?urls.primaryName=bookmarks)
- [Tags API](/swagger-ui/?urls.primaryName=tags)
    ",
        version = "1.0"
    ))]
    pub struct ApiDoc;

    pub fn docs() -> Vec<rocket::Route> {
        use crate::api::{bookmark, tag};

        let mut routes: Vec<rocket::Route> = SwaggerUi::new("/swagger-ui/<_..>")
            .urls(vec![
                (
                    Url::with_primary("main", "/api-docs/openapi.json", true),
                    ApiDoc::openapi(),
                ),
                (
                    Url::new("bookmarks", "/api-docs/openapi-bookmarks.json"),
                    bookmark::misc::ApiDoc::openapi(),
                ),
                (
                    Url::new("tags", "/api-docs/openapi-tags.json"),
                    tag::misc::ApiDoc::openapi(),
                ),
            ])
            .into();
        routes.extend(Vec::<rocket::Route>::from(
            RapiDoc::new("/api-docs/openapi-bookmarks.json").path("/rapidoc"),
        ));
        routes
    }
}

#[cfg(not(tarpaulin_include))]
pub async fn rocket() -> rocket::Rocket<rocket::Build> {
    use rocket::fairing::AdHoc;
    use rocket::fs::FileServer;
    use rocket_db_pools::Database;

    use crate::api::configs::{self, Config};
    use crate::api::fairings::db::Db;
    use crate::api::{bookmark, tag};
    use crate::misc;

    let cfg_provider = configs::config_provider();
    let ui_path = cfg_provider
        .extract_inner::<Option<String>>("ui_path")
        .ok()
        .flatten();

    let mut builder = rocket::custom(cfg_provider);
    if let Some(ui_path) = ui_path {
        // Serve the UI files if the path is provided
        builder = builder.mount("/", FileServer::from(ui_path));
    }
    builder
        .attach(AdHoc::try_on_ignite("Migrations", |rocket| async move {
            match crate::db::connection::run_migrations().await {
                Ok(()) => Ok(rocket),
                Err(e) => {
                    tracing::error!(?e, "failed to migrate database");
                    Err(rocket)
                }
            }
        }))
        .attach(Db::init())
        .mount("/api/bookmarks", bookmark::routes())
        .mount("/api/tags", tag::routes())
        .mount("/", misc::docs())
        .attach(AdHoc::config::<Config>())
}
