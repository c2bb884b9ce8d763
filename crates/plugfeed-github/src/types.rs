//! Subset of the GitHub releases payload.

use plugfeed_catalog::{RawAsset, RawRelease};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GithubRelease {
    pub tag_name: String,
    /// `null` for releases published without notes.
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub assets: Vec<GithubAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubAsset {
    pub browser_download_url: String,
    pub size: u64,
    pub download_count: u64,
    pub created_at: String,
}

impl From<GithubRelease> for RawRelease {
    fn from(r: GithubRelease) -> Self {
        RawRelease {
            tag: r.tag_name,
            body: r.body.unwrap_or_default(),
            assets: r.assets.into_iter().map(RawAsset::from).collect(),
        }
    }
}

impl From<GithubAsset> for RawAsset {
    fn from(a: GithubAsset) -> Self {
        RawAsset {
            download_url: a.browser_download_url,
            size: a.size,
            download_count: a.download_count,
            created_at: a.created_at,
        }
    }
}
