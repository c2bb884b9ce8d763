//! Health / heartbeat endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health))]
pub struct HealthApi;

/// Register health-check routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// Heartbeat endpoint.
///
/// Returns `{"status": "ok", "version": "...", "lastRefreshAt": ...}` with
/// HTTP 200. `lastRefreshAt` is `null` until the first refresh pass.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is healthy", body = Value)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let last_refresh_at = state.refresher.last_refresh_at();
    Json(json!({
        "status":        "ok",
        "version":       env!("CARGO_PKG_VERSION"),
        "lastRefreshAt": last_refresh_at.map(|t| t.to_rfc3339()),
    }))
}
