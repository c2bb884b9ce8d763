//! Server configuration.
//!
//! Runtime knobs come from environment variables; the GitHub token and an
//! optional list of tracked organizations come from a JSON file
//! (`PLUGFEED_CONFIG`, default `./config.json`):
//!
//! ```json
//! {
//!   "oauth": "ghp_…",
//!   "organizations": [
//!     { "name": "go-lang-plugin-org", "repositories": [ … ] }
//!   ]
//! }
//! ```

use std::path::Path;

use anyhow::Context;
use plugfeed_catalog::{Catalog, Organization, Shape, seed};
use serde::Deserialize;

/// Runtime configuration for plugfeed-server.
///
/// Every field has a default so the server starts without any environment
/// variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8080"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Path of the JSON configuration file.
    pub config_file: String,

    /// GitHub API root (default: `"https://api.github.com"`).
    pub github_api: String,

    /// GitHub token; `PLUGFEED_GITHUB_TOKEN` wins over the file's `oauth`.
    pub github_token: Option<String>,

    /// Timeout for each upstream request, in seconds.
    pub http_timeout_secs: u64,

    /// Minimum spacing between two catalog refreshes, in seconds.
    pub refresh_cooldown_secs: u64,

    /// Shape served by the plain descriptor routes.
    pub descriptor_shape: Shape,

    /// Comma-separated CORS origins; wildcard when unset.
    pub cors_allowed_origins: Option<String>,

    /// Tracked organizations; `None` selects the built-in seed.
    pub organizations: Option<Vec<Organization>>,
}

/// Contents of the JSON configuration file.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default, alias = "Oauth")]
    pub oauth: Option<String>,
    #[serde(default)]
    pub organizations: Option<Vec<Organization>>,
}

impl FileConfig {
    /// Read `path`. A missing file is not an error.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Option<Self>> {
        let path = path.as_ref();
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        let file = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(file))
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("PLUGFEED_BIND", "0.0.0.0:8080"),
            log_level: env_or("PLUGFEED_LOG", "info"),
            log_json: std::env::var("PLUGFEED_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            config_file: env_or("PLUGFEED_CONFIG", "./config.json"),
            github_api: env_or("PLUGFEED_GITHUB_API", plugfeed_github::DEFAULT_API_BASE),
            github_token: std::env::var("PLUGFEED_GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            http_timeout_secs: parse_env("PLUGFEED_HTTP_TIMEOUT_SECS", 30),
            refresh_cooldown_secs: parse_env("PLUGFEED_REFRESH_COOLDOWN_SECS", 300),
            descriptor_shape: parse_env("PLUGFEED_DESCRIPTOR_SHAPE", Shape::Rich),
            cors_allowed_origins: std::env::var("PLUGFEED_CORS_ORIGINS").ok(),
            organizations: None,
        }
    }

    /// Fold in the file configuration. Values already set from the
    /// environment take precedence.
    pub fn merge_file(&mut self, file: FileConfig) {
        if self.github_token.is_none() {
            self.github_token = file.oauth.filter(|t| !t.is_empty());
        }
        if file.organizations.is_some() {
            self.organizations = file.organizations;
        }
    }

    /// The catalog to seed the store with.
    pub fn initial_catalog(&self) -> Catalog {
        match &self.organizations {
            Some(orgs) => Catalog::new(orgs.clone()),
            None => seed::default_catalog(),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
impl Config {
    /// Defaults pointing the upstream at a closed local port.
    pub(crate) fn for_tests() -> Self {
        Config {
            bind_address: "127.0.0.1:0".into(),
            log_level: "info".into(),
            log_json: false,
            config_file: "./does-not-exist.json".into(),
            github_api: "http://127.0.0.1:1".into(),
            github_token: None,
            http_timeout_secs: 1,
            refresh_cooldown_secs: 300,
            descriptor_shape: Shape::Rich,
            cors_allowed_origins: None,
            organizations: None,
        }
    }
}
