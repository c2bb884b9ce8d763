//! Plugin descriptor routes.
//!
//! - `GET /{owner}/{repository}/{channel}.{format}`
//! - `GET /{owner}/{repository}/{channel}/idea.{format}`
//! - `GET /{owner}/{repository}/{channel}/updatePlugins.{format}`
//!
//! The first two serve the configured default shape, the last one always
//! serves the minimal manifest. `format` is `xml` or anything else for JSON.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use plugfeed_catalog::{Format, Shape, render};
use tracing::debug;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(channel_descriptor, named_descriptor))]
pub struct DescriptorApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{owner}/{repository}/{channel}",        get(channel_descriptor))
        .route("/{owner}/{repository}/{channel}/{file}", get(named_descriptor))
}

/// Descriptor for `{channel}.{format}` in the configured shape.
#[utoipa::path(
    get,
    path = "/{owner}/{repository}/{channel}",
    tag = "descriptor",
    params(
        ("owner" = String, Path, description = "GitHub organization"),
        ("repository" = String, Path, description = "Tracked repository"),
        ("channel" = String, Path, description = "`{channel}.{format}`, e.g. `alpha.xml`"),
    ),
    responses(
        (status = 200, description = "Plugin descriptor"),
        (status = 404, description = "Unknown repository or channel"),
    )
)]
pub async fn channel_descriptor(
    State(state): State<Arc<AppState>>,
    Path((owner, repository, file)): Path<(String, String, String)>,
) -> Result<Response, ServerError> {
    let (channel, ext) = split_extension(&file)
        .ok_or_else(|| ServerError::NotFound(format!("no descriptor named '{file}'")))?;
    respond(&state, &owner, &repository, channel, Format::from_extension(ext), state.config.descriptor_shape)
}

/// Descriptor for `{channel}/idea.{format}` (configured shape) or
/// `{channel}/updatePlugins.{format}` (minimal manifest).
#[utoipa::path(
    get,
    path = "/{owner}/{repository}/{channel}/{file}",
    tag = "descriptor",
    params(
        ("owner" = String, Path, description = "GitHub organization"),
        ("repository" = String, Path, description = "Tracked repository"),
        ("channel" = String, Path, description = "alpha, beta or release"),
        ("file" = String, Path, description = "`idea.{format}` or `updatePlugins.{format}`"),
    ),
    responses(
        (status = 200, description = "Plugin descriptor"),
        (status = 404, description = "Unknown repository, channel or file"),
    )
)]
pub async fn named_descriptor(
    State(state): State<Arc<AppState>>,
    Path((owner, repository, channel, file)): Path<(String, String, String, String)>,
) -> Result<Response, ServerError> {
    let not_found = || ServerError::NotFound(format!("no descriptor named '{file}'"));
    let (stem, ext) = split_extension(&file).ok_or_else(not_found)?;
    let shape = match stem {
        "idea" => state.config.descriptor_shape,
        "updatePlugins" => Shape::Minimal,
        _ => return Err(not_found()),
    };
    respond(&state, &owner, &repository, &channel, Format::from_extension(ext), shape)
}

fn respond(
    state: &AppState,
    owner: &str,
    repository: &str,
    channel: &str,
    format: Format,
    shape: Shape,
) -> Result<Response, ServerError> {
    let catalog = state.store.snapshot();
    let body = render(&catalog, owner, repository, channel, format, shape)?;
    debug!(owner, repository, channel, %format, %shape, bytes = body.len(), "descriptor rendered");
    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}

/// `"alpha.xml"` → `("alpha", "xml")`, split at the last dot.
fn split_extension(file: &str) -> Option<(&str, &str)> {
    file.rsplit_once('.').filter(|(stem, _)| !stem.is_empty())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn split_extension_uses_last_dot() {
        assert_eq!(split_extension("alpha.xml"), Some(("alpha", "xml")));
        assert_eq!(split_extension("release.json"), Some(("release", "json")));
        assert_eq!(split_extension("beta."), Some(("beta", "")));
        assert_eq!(split_extension("a.b.xml"), Some(("a.b", "xml")));
        assert_eq!(split_extension("alpha"), None);
        assert_eq!(split_extension(".xml"), None);
    }
}
