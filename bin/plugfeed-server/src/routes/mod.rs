//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - OpenAPI document at `/api-docs/openapi.json`
//! - Health / heartbeat route
//! - Catalog listing and refresh trigger
//! - Plugin descriptor routes
//! - Error-report forwarding

mod catalog;
pub mod doc;
mod descriptor;
mod health;
mod report;

use axum::routing::get;
use axum::{Json, Router, middleware};
use crate::middleware::{cors, trace};
use crate::state::AppState;
use std::sync::Arc;

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(health::router())
        .merge(catalog::router())
        .merge(report::router())
        .merge(descriptor::router())
        .route("/api-docs/openapi.json", get(|| async { Json(doc::get_docs()) }));

    api_router
        // Outermost layers execute first on the way in.
        .layer(cors::cors_layer(&state))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
