use axum::{extract::Extension, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    catalog: CatalogHealth,
    checked_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct CatalogHealth {
    backend: &'static str,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pool_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    idle_connections: Option<usize>,
}

/// Health check endpoint
///
/// Checks database connectivity when the catalog is Postgres-backed.
/// Returns 200 OK if healthy, 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let catalog = match &state.db_pool {
        None => CatalogHealth {
            backend: "memory",
            status: "ok".to_string(),
            error: None,
            pool_size: None,
            idle_connections: None,
        },
        Some(pool) => {
            let (status, error) = match tokio::time::timeout(
                std::time::Duration::from_secs(5),
                sqlx::query("SELECT 1").execute(pool),
            )
            .await
            {
                Ok(Ok(_)) => ("ok".to_string(), None),
                Ok(Err(e)) => ("error".to_string(), Some(format!("Query failed: {}", e))),
                Err(_) => ("error".to_string(), Some("Query timeout (>5s)".to_string())),
            };
            CatalogHealth {
                backend: "postgres",
                status,
                error,
                pool_size: Some(pool.size()),
                idle_connections: Some(pool.num_idle()),
            }
        }
    };

    let is_healthy = catalog.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            catalog,
            checked_at: Utc::now(),
        }),
    )
}
