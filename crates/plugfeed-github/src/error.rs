use plugfeed_catalog::CatalogError;
use thiserror::Error;

/// Errors that can be returned by GitHub API calls.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the response body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub answered with a non-2xx status.
    #[error("GitHub returned {status} for {url}")]
    Status { url: String, status: u16 },

    /// The response body was not the expected JSON shape.
    #[error("invalid GitHub API response: {0}")]
    Json(#[from] serde_json::Error),

    /// The call needs an API token and none is configured.
    #[error("no GitHub token configured")]
    MissingToken,
}

impl From<FetchError> for CatalogError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Json(_) => CatalogError::DecodeFailure(e.to_string()),
            _ => CatalogError::UpstreamUnavailable(e.to_string()),
        }
    }
}
