use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use shopfront_db::DbPool;
use tracing::warn;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

impl HealthCheck {
    fn ready(detail: impl Into<String>) -> Self {
        Self { status: "ready", detail: detail.into() }
    }

    fn degraded(detail: impl Into<String>) -> Self {
        Self { status: "degraded", detail: detail.into() }
    }

    fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: HealthCheck,
    pub catalog: HealthCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool })
}

/// Ready only when the database answers and the catalog tables can be read.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let catalog = if database.is_ready() {
        catalog_check(&state.db_pool).await
    } else {
        HealthCheck::degraded("skipped: database unreachable")
    };
    let ready = database.is_ready() && catalog.is_ready();

    if !ready {
        warn!(
            event_name = "system.health.degraded",
            correlation_id = "health",
            database = %database.detail,
            catalog = %catalog.detail,
            "health check degraded"
        );
    }

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        database,
        catalog,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthCheck::ready("database query succeeded"),
        Err(error) => HealthCheck::degraded(format!("database query failed: {error}")),
    }
}

async fn catalog_check(pool: &DbPool) -> HealthCheck {
    let counts = sqlx::query_as::<_, (i64, i64)>(
        "SELECT (SELECT COUNT(1) FROM categories), (SELECT COUNT(1) FROM products)",
    )
    .fetch_one(pool)
    .await;

    match counts {
        Ok((categories, products)) => {
            HealthCheck::ready(format!("{products} products across {categories} categories"))
        }
        Err(error) => HealthCheck::degraded(format!("catalog tables unreadable: {error}")),
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};
    use shopfront_db::{connect_with_settings, schema};

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_is_ready_with_schema_applied() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");
        schema::apply(&pool).await.expect("schema");

        let (status, Json(payload)) = health(State(HealthState { db_pool: pool.clone() })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.catalog.detail, "0 products across 0 categories");

        pool.close().await;
    }

    #[tokio::test]
    async fn health_is_degraded_without_catalog_tables() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");

        let (status, Json(payload)) = health(State(HealthState { db_pool: pool.clone() })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.database.status, "ready");
        assert_eq!(payload.catalog.status, "degraded");

        pool.close().await;
    }

    #[tokio::test]
    async fn health_is_degraded_when_database_is_closed() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");
        pool.close().await;

        let (status, Json(payload)) = health(State(HealthState { db_pool: pool })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.database.status, "degraded");
    }
}
