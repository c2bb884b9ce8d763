use thiserror::Error;

/// Errors produced while refreshing or rendering the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The upstream release API could not be reached or answered with a
    /// non-success status.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream answered, but the payload could not be decoded.
    #[error("malformed upstream payload: {0}")]
    DecodeFailure(String),

    /// Unknown organization, repository or channel.
    #[error("not found: {0}")]
    NotFound(String),

    /// Writing a descriptor failed.
    #[error("descriptor encoding failed: {0}")]
    Encode(String),
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Encode(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Encode(e.to_string())
    }
}
