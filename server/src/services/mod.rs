//! Services module - domain rules and the plain HTTP endpoints

pub mod conversations;

use crate::AppState;
use crate::core::AppError;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}

/// Readiness check: the database must answer a trivial query.
#[instrument(skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT 1").execute(state.pool()).await?;
    Ok(Json(json!({ "status": "ok" })))
}
