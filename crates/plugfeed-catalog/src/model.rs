//! Catalog data model.
//!
//! A [`Catalog`] is an ordered list of [`Organization`]s, each owning an
//! ordered list of tracked [`Repository`]s. Only [`Repository::versions`]
//! changes after startup, and only through the refresh coordinator.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Deployment channel a release is published on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    Alpha,
    Beta,
    Release,
}

/// One release resolved for a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Release tag, e.g. `"v1.0-release"`.
    pub name: String,
    /// Download location of the primary asset.
    pub url: String,
    /// Asset size in bytes.
    pub size: u64,
    /// Publish time, milliseconds since the Unix epoch.
    pub date: i64,
    /// Changelog text.
    pub body: String,
    pub download_count: u64,
}

/// The latest resolved release per channel. `None` means nothing has been
/// resolved for that channel yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryVersions {
    pub alpha: Option<Version>,
    pub beta: Option<Version>,
    pub release: Option<Version>,
}

impl RepositoryVersions {
    pub fn get(&self, channel: Channel) -> Option<&Version> {
        self.slot(channel).as_ref()
    }

    pub fn slot(&self, channel: Channel) -> &Option<Version> {
        match channel {
            Channel::Alpha => &self.alpha,
            Channel::Beta => &self.beta,
            Channel::Release => &self.release,
        }
    }

    pub fn slot_mut(&mut self, channel: Channel) -> &mut Option<Version> {
        match channel {
            Channel::Alpha => &mut self.alpha,
            Channel::Beta => &mut self.beta,
            Channel::Release => &mut self.release,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.alpha.is_none() && self.beta.is_none() && self.release.is_none()
    }
}

/// Contact metadata rendered into the plugin descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub email: String,
    pub url: String,
    /// Display name.
    pub name: String,
}

/// A tracked upstream project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    /// Stable plugin identifier, e.g. `"ro.redeul.google.go"`.
    pub id: String,
    /// Upstream repository slug; used to build the fetch URL.
    pub name: String,
    pub plugin_name: String,
    pub description: String,
    pub vendor: Vendor,
    #[serde(default)]
    pub versions: RepositoryVersions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    pub repositories: Vec<Repository>,
}

/// The full set of tracked organizations, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub organizations: Vec<Organization>,
}

impl Catalog {
    pub fn new(organizations: Vec<Organization>) -> Self {
        Self { organizations }
    }

    /// Look up a repository by organization name and repository slug.
    pub fn find_repository(&self, owner: &str, repo: &str) -> Option<&Repository> {
        self.organizations
            .iter()
            .find(|o| o.name == owner)?
            .repositories
            .iter()
            .find(|r| r.name == repo)
    }

    pub fn find_repository_mut(&mut self, owner: &str, repo: &str) -> Option<&mut Repository> {
        self.organizations
            .iter_mut()
            .find(|o| o.name == owner)?
            .repositories
            .iter_mut()
            .find(|r| r.name == repo)
    }

    /// Every `(organization name, repository)` pair in listing order.
    pub fn repositories(&self) -> impl Iterator<Item = (&str, &Repository)> {
        self.organizations
            .iter()
            .flat_map(|o| o.repositories.iter().map(move |r| (o.name.as_str(), r)))
    }
}
