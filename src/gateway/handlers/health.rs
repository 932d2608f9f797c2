//! Health check handler

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::core_types::now_ms;

use super::super::state::AppState;
use super::super::types::{ApiResponse, error_codes};

/// Health check response data
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    pub timestamp_ms: i64,
    /// Backing store ("memory" / "postgres")
    pub store: &'static str,
    /// Build commit
    pub version: &'static str,
    /// PostgreSQL round trip, when that store is in use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_latency_ms: Option<u64>,
}

/// GET /health
///
/// - Healthy: 200 OK + {code: 0, data: {timestamp_ms, store, version, db_latency_ms?}}
/// - Database unreachable: 503 + {code: 5001, msg: "unavailable"}
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let db_latency_ms = match state.pg_db {
        Some(ref db) => match db.health_check().await {
            Ok(ms) => Some(ms),
            Err(e) => {
                tracing::error!("[HEALTH] PostgreSQL ping failed: {}", e);
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ApiResponse {
                        code: error_codes::SERVICE_UNAVAILABLE,
                        msg: "unavailable".to_string(),
                        data: None,
                    }),
                );
            }
        },
        None => None,
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(HealthResponse {
            timestamp_ms: now_ms(),
            store: state.service.store_name(),
            version: env!("GIT_HASH"),
            db_latency_ms,
        })),
    )
}
