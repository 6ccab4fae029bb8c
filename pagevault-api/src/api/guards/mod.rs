use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use tracing::warn;

use crate::api::configs::Config;
use crate::api::errors::Error;

/// Passes when no API key is configured, or when the `Authorization` header
/// carries it.
pub struct Auth;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Auth {
    type Error = Error;

    async fn from_request(request: &'r rocket::Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(config) = request.rocket().state::<Config>() else {
            return Outcome::Error((
                Status::InternalServerError,
                Error::InternalServer("Missing Config".to_string()),
            ));
        };
        let Some(key) = config.api_key.as_ref() else {
            return Outcome::Success(Auth);
        };
        match request.headers().get_one("Authorization") {
            Some(token) if token == key => Outcome::Success(Auth),
            Some(_) => {
                warn!(uri = %request.uri(), "rejected invalid api key");
                Outcome::Error((
                    Status::Forbidden,
                    Error::InvalidAPIKey("Invalid API Key".to_string()),
                ))
            }
            None => Outcome::Error((
                Status::Unauthorized,
                Error::MissingAPIKey("Missing API Key".to_string()),
            )),
        }
    }
}
