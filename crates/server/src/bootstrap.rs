use shopfront_core::config::{AppConfig, ConfigError};
use shopfront_db::{connect_with_config, schema, DbPool};
use thiserror::Error;
use tracing::{info, warn};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("catalog schema could not be applied: {0}")]
    Schema(#[source] sqlx::Error),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        max_connections = config.database.max_connections,
        "database connection established"
    );

    schema::apply(&db_pool).await.map_err(BootstrapError::Schema)?;

    if !config.admin_enabled() {
        warn!(
            event_name = "system.bootstrap.admin_disabled",
            correlation_id = "bootstrap",
            "no admin token configured; catalog writes will be refused"
        );
    }

    Ok(Application { config, db_pool })
}

#[cfg(test)]
mod tests {
    use shopfront_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use crate::bootstrap::{bootstrap_with_config, Application, BootstrapError};

    async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
        bootstrap_with_config(AppConfig::load(options)?).await
    }

    fn options(database_url: &str, admin_token: Option<&str>) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                admin_token: admin_token.map(str::to_string),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_short_admin_token() {
        let result = bootstrap(options("sqlite::memory:", Some("short"))).await;

        let message = result.err().expect("error").to_string();
        assert!(message.contains("auth.admin_token"));
    }

    #[tokio::test]
    async fn bootstrap_applies_catalog_schema() {
        let app = bootstrap(options("sqlite::memory:", Some("bootstrap-admin-token")))
            .await
            .expect("bootstrap should succeed with valid overrides");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('categories', 'products')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("catalog tables should exist after bootstrap");

        assert_eq!(table_count, 2);
        assert!(app.config.admin_enabled());
        app.db_pool.close().await;
    }
}
