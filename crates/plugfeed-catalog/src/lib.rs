//! plugfeed-catalog – release catalog and channel resolution.
//!
//! ```text
//! ReleaseSource ──► classify ──► CatalogStore ──► descriptor::render
//!        ▲                            ▲
//!        └──── RefreshCoordinator ────┘
//! ```
//!
//! The catalog is in-memory only and rebuilt from the upstream on every
//! refresh.

pub mod classify;
pub mod descriptor;
pub mod error;
pub mod model;
pub mod refresh;
pub mod seed;
pub mod store;

pub use classify::{RawAsset, RawRelease, channel_for_tag, classify, classify_at};
pub use descriptor::{Descriptor, Format, Shape, render};
pub use error::CatalogError;
pub use model::{Catalog, Channel, Organization, Repository, RepositoryVersions, Vendor, Version};
pub use refresh::{DEFAULT_COOLDOWN, RefreshCoordinator, RefreshOutcome, ReleaseSource, SkipReason};
pub use store::CatalogStore;
