use std::time::Duration;

use shopfront_core::config::DatabaseConfig;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::debug;

pub type DbPool = sqlx::SqlitePool;

pub async fn connect_with_config(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&config.url, config.max_connections, config.timeout_secs).await
}

/// Opens a pool with foreign keys enforced on every connection.
///
/// Each connection to a private in-memory database sees its own empty
/// database, so those URLs are pinned to a single connection.
pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    let private_memory = is_private_memory_url(database_url);
    let max_connections = if private_memory { 1 } else { max_connections.max(1) };
    debug!(
        event_name = "db.pool.connect",
        max_connections,
        timeout_secs,
        "opening sqlite pool"
    );

    let mut options = SqlitePoolOptions::new().max_connections(max_connections);
    if private_memory {
        // Dropping the only connection would discard the database.
        options = options.min_connections(1).idle_timeout(None).max_lifetime(None);
    }

    options
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

fn is_private_memory_url(database_url: &str) -> bool {
    let url = database_url.trim();
    (url == ":memory:" || url.starts_with("sqlite::memory:")) && !url.contains("cache=shared")
}
