//! GitHub adapter for plugfeed.
//!
//! [`GithubClient`] implements [`plugfeed_catalog::ReleaseSource`] over the
//! releases API and forwards error reports to the issue tracker.

pub mod client;
pub mod error;
pub mod types;

pub use client::{DEFAULT_API_BASE, GithubClient, GithubClientBuilder};
pub use error::FetchError;
pub use types::{GithubAsset, GithubRelease};
