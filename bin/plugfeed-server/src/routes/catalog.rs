//! Catalog listing and refresh trigger.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use plugfeed_catalog::{Catalog, RefreshOutcome, SkipReason};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(list_catalog, refresh_catalog))]
pub struct CatalogApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/",       get(list_catalog))
        .route("/update", get(refresh_catalog).post(refresh_catalog))
}

/// Every tracked organization with its repositories and resolved versions.
#[utoipa::path(
    get,
    path = "/",
    tag = "catalog",
    responses((status = 200, description = "Full catalog as JSON"))
)]
pub async fn list_catalog(State(state): State<Arc<AppState>>) -> Json<Catalog> {
    let snapshot = state.store.snapshot();
    Json(Catalog::clone(&snapshot))
}

/// Re-resolve every tracked repository from GitHub.
///
/// Throttled: a call within the cooldown of the previous refresh only
/// returns the cooldown message.
#[utoipa::path(
    get,
    path = "/update",
    tag = "catalog",
    responses((status = 200, description = "Plain-text refresh outcome", body = String))
)]
pub async fn refresh_catalog(State(state): State<Arc<AppState>>) -> String {
    match state.refresher.refresh(Utc::now()).await {
        RefreshOutcome::Applied { .. } => "Remote repositories updated".to_owned(),
        RefreshOutcome::Skipped(SkipReason::Cooldown) => format!(
            "Repositories were updated less than {} ago. Please come back later.",
            describe(state.refresher.cooldown())
        ),
    }
}

/// `"5 minutes"`, `"1 minute"`, or `"90 seconds"` when not a whole minute.
fn describe(d: Duration) -> String {
    let secs = d.as_secs();
    match (secs / 60, secs % 60) {
        (1, 0) => "1 minute".to_owned(),
        (m, 0) if m > 0 => format!("{m} minutes"),
        _ => format!("{secs} seconds"),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cooldown_wording() {
        assert_eq!(describe(Duration::from_secs(300)), "5 minutes");
        assert_eq!(describe(Duration::from_secs(60)), "1 minute");
        assert_eq!(describe(Duration::from_secs(90)), "90 seconds");
        assert_eq!(describe(Duration::from_secs(0)), "0 seconds");
    }
}
