//! Shared application state injected into every Axum handler.

use std::sync::Arc;
use std::time::Duration;

use plugfeed_catalog::{CatalogStore, RefreshCoordinator, ReleaseSource};
use plugfeed_github::GithubClient;

use crate::config::Config;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env + file derived).
    pub config: Arc<Config>,
    /// Current catalog snapshot.
    pub store: Arc<CatalogStore>,
    /// Throttled refresh of `store` from the upstream.
    pub refresher: Arc<RefreshCoordinator>,
    /// Used to forward error reports.
    pub github: Arc<GithubClient>,
}

impl AppState {
    /// Seed the store from `config` and wire the refresh coordinator to
    /// `source`.
    pub fn new(config: Config, github: Arc<GithubClient>, source: Arc<dyn ReleaseSource>) -> Self {
        let store = Arc::new(CatalogStore::new(config.initial_catalog()));
        let refresher = Arc::new(RefreshCoordinator::with_cooldown(
            Arc::clone(&store),
            source,
            Duration::from_secs(config.refresh_cooldown_secs),
        ));

        Self {
            config: Arc::new(config),
            store,
            refresher,
            github,
        }
    }
}
