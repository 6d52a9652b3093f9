/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// GET /api/v1/health
/// ```
///
/// # Response
///
/// ```json
/// { "status": "ok", "version": "0.1.0", "database": "connected" }
/// ```
///
/// `database` is omitted when the server runs without PostgreSQL, and the
/// status turns `degraded` when the pool cannot reach it.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::app::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match &state.db {
        Some(pool) => match kanban_shared::db::pool::health_check(pool).await {
            Ok(()) => Some("connected"),
            Err(err) => {
                tracing::warn!(error = %err, "database health check failed");
                Some("disconnected")
            }
        },
        None => None,
    };

    let status = if database == Some("disconnected") {
        "degraded"
    } else {
        "ok"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.map(String::from),
    })
}
