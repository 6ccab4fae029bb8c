use std::io;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter};

pub fn setup_console_log() {
    let console_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(io::stdout)
        .boxed();

    tracing_subscriber::registry()
        .with(vec![console_log])
        .with(EnvFilter::from_default_env())
        .init();
}

/// Console output plus a daily rotated file under `log_dir`.
///
/// Log lines are written by a background worker; keep the returned guard
/// alive until shutdown or buffered lines are lost.
pub fn setup_file_log(log_dir: &str) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(log_dir, "pagevault.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let console_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(io::stdout)
        .boxed();
    let file_log = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .boxed();

    tracing_subscriber::registry()
        .with(vec![console_log, file_log])
        .with(EnvFilter::from_default_env())
        .init();
    guard
}
