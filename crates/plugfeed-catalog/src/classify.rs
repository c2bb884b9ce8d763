//! Release classification.
//!
//! Turns an upstream release list into one [`Version`] per [`Channel`].
//!
//! # Input order
//!
//! The classifier keeps the *first* release it sees for each channel. It
//! resolves the most recent release per channel only when the caller passes
//! the list newest-first, which is the order the GitHub releases API
//! returns. No sorting happens here.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::model::{Channel, RepositoryVersions, Version};

/// Tag keywords in priority order. A tag containing several keywords
/// resolves to the first one listed.
const CHANNEL_KEYWORDS: [(&str, Channel); 3] = [
    ("alpha", Channel::Alpha),
    ("beta", Channel::Beta),
    ("release", Channel::Release),
];

/// Timestamp shape used by the upstream for asset creation times.
const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One release as reported by the upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRelease {
    pub tag: String,
    pub body: String,
    /// Release assets; only the first one is read.
    pub assets: Vec<RawAsset>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAsset {
    pub download_url: String,
    pub size: u64,
    pub download_count: u64,
    pub created_at: String,
}

/// Channel a tag belongs to, if any.
pub fn channel_for_tag(tag: &str) -> Option<Channel> {
    CHANNEL_KEYWORDS
        .iter()
        .find(|(keyword, _)| tag.contains(keyword))
        .map(|&(_, channel)| channel)
}

/// Classify `releases` using the current time as the fallback date.
pub fn classify(releases: &[RawRelease]) -> RepositoryVersions {
    classify_at(releases, Utc::now())
}

/// Classify `releases`, using `now` for assets whose creation time does not
/// parse.
pub fn classify_at(releases: &[RawRelease], now: DateTime<Utc>) -> RepositoryVersions {
    let mut versions = RepositoryVersions::default();

    for release in releases {
        let Some(asset) = release.assets.first() else {
            tracing::debug!(tag = %release.tag, "skipping release without assets");
            continue;
        };
        let Some(channel) = channel_for_tag(&release.tag) else {
            continue;
        };

        let slot = versions.slot_mut(channel);
        if slot.is_some() {
            continue;
        }

        *slot = Some(Version {
            name: release.tag.clone(),
            url: asset.download_url.clone(),
            size: asset.size,
            date: release_millis(&asset.created_at, now),
            body: release.body.clone(),
            download_count: asset.download_count,
        });
    }

    versions
}

/// Whole seconds since the epoch, times 1000.
fn release_millis(created_at: &str, now: DateTime<Utc>) -> i64 {
    let secs = match NaiveDateTime::parse_from_str(created_at, CREATED_AT_FORMAT) {
        Ok(t) => t.and_utc().timestamp(),
        Err(e) => {
            tracing::debug!(created_at, error = %e, "unparseable asset timestamp, using now");
            now.timestamp()
        }
    };
    secs * 1000
}
