//! Health check endpoint handlers.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;

/// Service mode reported by the health check.
pub const SERVICE_MODE: &str = "DEMO";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub mode: String,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// API version response.
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
}

/// Health check endpoint.
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        mode: SERVICE_MODE.to_string(),
    })
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK if the service can accept traffic (database connected).
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => Ok(Json(StatusResponse {
            status: "ready".to_string(),
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            Err(ApiError::ServiceUnavailable("Database unavailable".to_string()))
        }
    }
}

/// GET /api/version
pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
