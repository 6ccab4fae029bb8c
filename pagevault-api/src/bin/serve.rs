use pagevault_api::api::configs::{config_provider, Config};
use pagevault_api::utils::logging;

#[rocket::main]
async fn main() -> Result<(), rocket::Error> {
    let log_dir = config_provider()
        .extract::<Config>()
        .ok()
        .and_then(|config| config.log_dir);
    // dropping the guard flushes the file log
    let _guard = match log_dir {
        Some(log_dir) => Some(logging::setup_file_log(&log_dir)),
        None => {
            logging::setup_console_log();
            None
        }
    };

    let _ = pagevault_api::rocket().await.launch().await?;
    Ok(())
}
