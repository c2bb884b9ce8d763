//! Built-in set of tracked repositories.

use crate::model::{Catalog, Organization, Repository, RepositoryVersions, Vendor};

pub const DEFAULT_ORGANIZATION: &str = "go-lang-plugin-org";
pub const DEFAULT_REPOSITORY: &str = "go-lang-idea-plugin";

/// The catalog tracked when no configuration overrides it. No versions are
/// resolved until the first refresh.
pub fn default_catalog() -> Catalog {
    Catalog::new(vec![Organization {
        name: DEFAULT_ORGANIZATION.into(),
        repositories: vec![Repository {
            id: "ro.redeul.google.go".into(),
            name: DEFAULT_REPOSITORY.into(),
            plugin_name: "Go language (golang.org) support plugin".into(),
            description: "Google Go language IDE built using the Intellij Platform. \
                Released both an integrated IDE and as a standalone Intellij IDEA plugin"
                .into(),
            vendor: Vendor {
                email: "mtoader@gmail.com".into(),
                url: "https://github.com/go-lang-plugin-org/go-lang-idea-plugin".into(),
                name: "mtoader@gmail.com".into(),
            },
            versions: RepositoryVersions::default(),
        }],
    }])
}
