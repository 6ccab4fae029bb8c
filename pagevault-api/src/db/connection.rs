use anyhow::Context;
use diesel_async::AsyncPgConnection;

use crate::api::configs;

/// Standalone connection outside the rocket pool, for migrations and tests.
pub async fn establish() -> anyhow::Result<AsyncPgConnection> {
    use diesel_async::AsyncConnection;

    let url = configs::get_database_url().context("databases.main.url is not configured")?;

    let mut conn = AsyncPgConnection::establish(&url)
        .await
        .context("Error connecting database")?;

    if cfg!(debug_assertions) {
        conn.set_instrumentation(crate::api::fairings::db::trace_queries);
    }

    Ok(conn)
}

pub async fn run_migrations() -> anyhow::Result<()> {
    use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");
    let conn = establish().await?;

    let mut async_wrapper: AsyncConnectionWrapper<AsyncPgConnection> =
        AsyncConnectionWrapper::from(conn);

    let applied = tokio::task::spawn_blocking(move || {
        async_wrapper
            .run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(|e| anyhow::anyhow!("failed to run migrations: {e}"))
    })
    .await??;
    tracing::info!(applied, "database migrations finished");
    Ok(())
}
