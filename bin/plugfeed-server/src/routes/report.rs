//! Error-report forwarding.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use tracing::{info, warn};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(submit_error))]
pub struct ReportApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/{owner}/{repository}/submitError", post(submit_error))
}

/// Forward an IDE error report to the repository's GitHub issue tracker.
///
/// The body is passed through unchanged as the GitHub issue payload. The
/// upstream call runs in the background; its outcome is only logged.
#[utoipa::path(
    post,
    path = "/{owner}/{repository}/submitError",
    tag = "report",
    params(
        ("owner" = String, Path, description = "GitHub organization"),
        ("repository" = String, Path, description = "Tracked repository"),
    ),
    request_body(content = String, content_type = "application/json", description = "GitHub issue payload"),
    responses(
        (status = 202, description = "Report accepted for forwarding"),
        (status = 400, description = "Empty report"),
        (status = 404, description = "Repository is not tracked"),
    )
)]
pub async fn submit_error(
    State(state): State<Arc<AppState>>,
    Path((owner, repository)): Path<(String, String)>,
    body: Bytes,
) -> Result<StatusCode, ServerError> {
    if state.store.snapshot().find_repository(&owner, &repository).is_none() {
        return Err(ServerError::NotFound(format!("repository {owner}/{repository}")));
    }
    if body.is_empty() {
        return Err(ServerError::BadRequest("empty error report".into()));
    }

    info!(%owner, %repository, bytes = body.len(), "forwarding error report");
    let github = Arc::clone(&state.github);
    tokio::spawn(async move {
        if let Err(e) = github.submit_issue(&owner, &repository, body.to_vec()).await {
            warn!(%owner, %repository, error = %e, "error report not forwarded");
        }
    });

    Ok(StatusCode::ACCEPTED)
}
