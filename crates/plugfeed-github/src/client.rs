use std::time::Duration;

use async_trait::async_trait;
use plugfeed_catalog::{CatalogError, RawRelease, ReleaseSource};
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, info};

use crate::error::FetchError;
use crate::types::GithubRelease;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Releases requested per call; GitHub caps a page at 100.
const PER_PAGE: u32 = 100;

/// Builder for [`GithubClient`].
///
/// # Example
/// ```rust,no_run
/// # async fn run() -> Result<(), plugfeed_github::FetchError> {
/// use plugfeed_github::GithubClientBuilder;
/// let client = GithubClientBuilder::new()
///     .set_token("ghp_example")
///     .build()?;
/// let releases = client.releases("go-lang-plugin-org", "go-lang-idea-plugin").await?;
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct GithubClientBuilder {
    pub(crate) api_base: String,
    pub(crate) token: Option<String>,
    pub(crate) timeout: Duration,
}

impl Default for GithubClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GithubClientBuilder {
    pub fn new() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the API root (default: `https://api.github.com`).
    pub fn set_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Token sent as `Authorization: token …`.
    pub fn set_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Per-request timeout (default: 30 s).
    pub fn set_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<GithubClient, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("plugfeed/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()?;

        Ok(GithubClient {
            api_base: self.api_base,
            token: self.token,
            client,
        })
    }
}

/// Minimal GitHub REST client: release listing and issue creation.
#[derive(Debug, Clone)]
pub struct GithubClient {
    api_base: String,
    token: Option<String>,
    client: Client,
}

impl GithubClient {
    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.token {
            Some(token) => builder.header("Authorization", format!("token {token}")),
            None => builder,
        }
    }

    /// Releases of `owner/repo`, newest first.
    pub async fn releases(&self, owner: &str, repo: &str) -> Result<Vec<GithubRelease>, FetchError> {
        let url = format!("{}/repos/{owner}/{repo}/releases", self.api_base);
        debug!(%url, "listing releases");

        let resp = self
            .request(self.client.get(&url))
            .query(&[("per_page", PER_PAGE)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status: status.as_u16() });
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Open an issue on `owner/repo` with `payload` as the request body.
    ///
    /// The payload is forwarded untouched; callers send GitHub's issue JSON
    /// (`{"title": …, "body": …}`).
    pub async fn submit_issue(
        &self,
        owner: &str,
        repo: &str,
        payload: Vec<u8>,
    ) -> Result<StatusCode, FetchError> {
        if self.token.is_none() {
            return Err(FetchError::MissingToken);
        }

        let url = format!("{}/repos/{owner}/{repo}/issues", self.api_base);
        let resp = self
            .request(self.client.post(&url))
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status: status.as_u16() });
        }
        info!(owner, repo, status = status.as_u16(), "error report forwarded");
        Ok(status)
    }
}

#[async_trait]
impl ReleaseSource for GithubClient {
    async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<RawRelease>, CatalogError> {
        let releases = self.releases(owner, repo).await?;
        Ok(releases.into_iter().map(RawRelease::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> GithubClient {
        GithubClientBuilder::new()
            .set_api_base(server.uri())
            .set_token("secret")
            .build()
            .unwrap()
    }

    #[test]
    fn builder_defaults() {
        let b = GithubClientBuilder::new();
        assert_eq!(b.api_base, DEFAULT_API_BASE);
        assert!(b.token.is_none());
        assert_eq!(b.timeout, Duration::from_secs(30));
    }

    #[test]
    fn api_base_drops_trailing_slash() {
        let b = GithubClientBuilder::new().set_api_base("http://localhost:9000/");
        assert_eq!(b.api_base, "http://localhost:9000");
    }

    #[tokio::test]
    async fn list_releases_maps_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/plugin/releases"))
            .and(query_param("per_page", "100"))
            .and(header("authorization", "token secret"))
            .and(header("accept", "application/vnd.github+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "tag_name": "v1.0-release",
                    "body": "first stable",
                    "draft": false,
                    "assets": [{
                        "name": "plugin.zip",
                        "browser_download_url": "https://example.com/plugin.zip",
                        "size": 4096,
                        "download_count": 12,
                        "created_at": "2014-05-01T10:00:00Z"
                    }]
                },
                { "tag_name": "v0.9-beta", "body": null, "assets": [] }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let releases = client_for(&server).await.list_releases("org", "plugin").await.unwrap();

        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].tag, "v1.0-release");
        assert_eq!(releases[0].body, "first stable");
        assert_eq!(releases[0].assets[0].download_url, "https://example.com/plugin.zip");
        assert_eq!(releases[0].assets[0].size, 4096);
        assert_eq!(releases[0].assets[0].download_count, 12);
        assert_eq!(releases[1].body, "");
        assert!(releases[1].assets.is_empty());
    }

    #[tokio::test]
    async fn error_status_is_upstream_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client_for(&server).await.list_releases("org", "plugin").await.unwrap_err();
        assert!(matches!(err, CatalogError::UpstreamUnavailable(_)), "{err:?}");
    }

    #[tokio::test]
    async fn malformed_body_is_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"message\": \"not a list\"}"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.list_releases("org", "plugin").await.unwrap_err();
        assert!(matches!(err, CatalogError::DecodeFailure(_)), "{err:?}");
    }

    #[tokio::test]
    async fn unreachable_host_is_upstream_unavailable() {
        let client = GithubClientBuilder::new()
            .set_api_base("http://127.0.0.1:1")
            .set_timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let err = client.list_releases("org", "plugin").await.unwrap_err();
        assert!(matches!(err, CatalogError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn submit_issue_forwards_body_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/org/plugin/issues"))
            .and(header("authorization", "token secret"))
            .and(body_string(r#"{"title":"crash"}"#))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let status = client_for(&server)
            .await
            .submit_issue("org", "plugin", br#"{"title":"crash"}"#.to_vec())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn submit_issue_without_token_is_rejected() {
        let client = GithubClientBuilder::new().build().unwrap();
        let err = client.submit_issue("org", "plugin", Vec::new()).await.unwrap_err();
        assert!(matches!(err, FetchError::MissingToken));
    }
}
