use rocket::{
    figment::Figment,
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Config {
    /// Directory of the static web UI, not served when unset.
    pub ui_path: Option<String>,
    /// Required in the `Authorization` header when set.
    pub api_key: Option<String>,
    /// Daily rotated log files are written here when set.
    pub log_dir: Option<String>,
}

pub fn config_provider() -> Figment {
    use rocket::figment::providers::{Env, Serialized};

    rocket::figment::Figment::from(rocket::Config::default())
        .merge(Serialized::defaults(Config::default()))
        .merge(("databases.main", rocket_db_pools::Config::default()))
        .merge(Env::prefixed("PV_").global())
}

pub fn get_database_url() -> Result<String, rocket::figment::Error> {
    config_provider().extract_inner("databases.main.url")
}

#[cfg(test)]
mod test {
    use super::*;
    use rocket::figment::providers::Serialized;

    #[test]
    fn defaults_leave_api_open() {
        let config: Config = config_provider().extract().unwrap();
        assert!(config.ui_path.is_none());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn later_layers_win() {
        let provider = config_provider()
            .merge(Serialized::default("api_key", "secret"))
            .merge(("databases.main.url", "postgres://localhost/pagevault"));
        let config: Config = provider.extract().unwrap();
        assert_eq!(config.api_key.as_deref(), Some("secret"));

        let url: String = provider.extract_inner("databases.main.url").unwrap();
        assert_eq!(url, "postgres://localhost/pagevault");
    }
}
