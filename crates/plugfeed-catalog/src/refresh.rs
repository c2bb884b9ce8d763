//! Throttled catalog refresh.
//!
//! [`RefreshCoordinator::refresh`] re-resolves every tracked repository from
//! a [`ReleaseSource`] and publishes the result through the
//! [`CatalogStore`]. At most one refresh runs at a time; attempts within the
//! cooldown window after the previous one are skipped.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::classify::{RawRelease, classify_at};
use crate::error::CatalogError;
use crate::model::RepositoryVersions;
use crate::store::CatalogStore;

/// Minimum time between two refresh passes.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5 * 60);

/// Upstream provider of release lists.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Releases of `owner/repo`, newest first.
    async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<RawRelease>, CatalogError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The previous refresh started less than the cooldown ago.
    Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Skipped(SkipReason),
    /// The pass ran. `failed` repositories kept their previous versions.
    Applied { updated: usize, failed: usize },
}

pub struct RefreshCoordinator {
    store: Arc<CatalogStore>,
    source: Arc<dyn ReleaseSource>,
    cooldown: TimeDelta,
    /// Held for a whole pass; guards the cooldown check.
    gate: Mutex<Option<DateTime<Utc>>>,
    /// Copy of the last start time, readable while a pass is running.
    started_at: RwLock<Option<DateTime<Utc>>>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

impl RefreshCoordinator {
    pub fn new(store: Arc<CatalogStore>, source: Arc<dyn ReleaseSource>) -> Self {
        Self::with_cooldown(store, source, DEFAULT_COOLDOWN)
    }

    pub fn with_cooldown(
        store: Arc<CatalogStore>,
        source: Arc<dyn ReleaseSource>,
        cooldown: Duration,
    ) -> Self {
        Self {
            store,
            source,
            cooldown: TimeDelta::from_std(cooldown).unwrap_or(TimeDelta::MAX),
            gate: Mutex::new(None),
            started_at: RwLock::new(None),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown.to_std().unwrap_or(DEFAULT_COOLDOWN)
    }

    /// Start time of the most recent refresh pass, if any.
    ///
    /// Never waits on a running pass.
    pub fn last_refresh_at(&self) -> Option<DateTime<Utc>> {
        *self.started_at.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one refresh pass at `now` unless the cooldown has not elapsed.
    ///
    /// The lock is held across all upstream fetches, so concurrent callers
    /// queue behind a running pass and then observe its cooldown.
    pub async fn refresh(&self, now: DateTime<Utc>) -> RefreshOutcome {
        let mut last = self.gate.lock().await;

        if let Some(previous) = *last {
            if now.signed_duration_since(previous) < self.cooldown {
                info!(%previous, "refresh skipped: cooldown");
                return RefreshOutcome::Skipped(SkipReason::Cooldown);
            }
        }
        *last = Some(now);
        *self.started_at.write().unwrap_or_else(PoisonError::into_inner) = Some(now);

        let snapshot = self.store.snapshot();
        let mut resolved: Vec<(String, String, RepositoryVersions)> = Vec::new();
        let mut failed = 0;

        for (owner, repository) in snapshot.repositories() {
            match self.source.list_releases(owner, &repository.name).await {
                Ok(releases) => {
                    let versions = classify_at(&releases, now);
                    info!(
                        owner,
                        repo = %repository.name,
                        releases = releases.len(),
                        alpha = versions.alpha.as_ref().map(|v| v.name.as_str()),
                        beta = versions.beta.as_ref().map(|v| v.name.as_str()),
                        release = versions.release.as_ref().map(|v| v.name.as_str()),
                        "repository resolved"
                    );
                    resolved.push((owner.to_owned(), repository.name.clone(), versions));
                }
                Err(e) => {
                    warn!(owner, repo = %repository.name, error = %e, "keeping previous versions");
                    failed += 1;
                }
            }
        }

        let updated = resolved.len();
        self.store.apply_refresh(|catalog| {
            for (owner, repo, versions) in resolved {
                if let Some(repository) = catalog.find_repository_mut(&owner, &repo) {
                    repository.versions = versions;
                }
            }
        });

        info!(updated, failed, "refresh applied");
        RefreshOutcome::Applied { updated, failed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::classify::RawAsset;
    use crate::model::{Catalog, Organization, Repository, Vendor, Version};

    /// Serves canned release lists; repositories missing from the map fail.
    #[derive(Default)]
    struct FakeSource {
        releases: HashMap<String, Vec<RawRelease>>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn with(mut self, repo: &str, tags: &[&str]) -> Self {
            let releases = tags
                .iter()
                .map(|tag| RawRelease {
                    tag: (*tag).into(),
                    body: String::new(),
                    assets: vec![RawAsset {
                        download_url: format!("https://example.com/{tag}.zip"),
                        size: 10,
                        download_count: 1,
                        created_at: "2014-05-01T10:00:00Z".into(),
                    }],
                })
                .collect();
            self.releases.insert(repo.into(), releases);
            self
        }
    }

    #[async_trait]
    impl ReleaseSource for FakeSource {
        async fn list_releases(&self, _owner: &str, repo: &str) -> Result<Vec<RawRelease>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.releases
                .get(repo)
                .cloned()
                .ok_or_else(|| CatalogError::UpstreamUnavailable(format!("{repo}: 502")))
        }
    }

    fn repo(name: &str, versions: RepositoryVersions) -> Repository {
        Repository {
            id: format!("com.example.{name}"),
            name: name.into(),
            plugin_name: name.into(),
            description: String::new(),
            vendor: Vendor::default(),
            versions,
        }
    }

    fn two_repo_store(previous: RepositoryVersions) -> Arc<CatalogStore> {
        Arc::new(CatalogStore::new(Catalog::new(vec![Organization {
            name: "org".into(),
            repositories: vec![repo("good", RepositoryVersions::default()), repo("flaky", previous)],
        }])))
    }

    fn at(minute: u32, second: u32) -> DateTime<Utc> {
        use chrono::TimeZone;
        Utc.with_ymd_and_hms(2024, 1, 1, 12, minute, second).unwrap()
    }

    #[tokio::test]
    async fn second_refresh_within_cooldown_is_skipped() {
        let store = two_repo_store(RepositoryVersions::default());
        let source = Arc::new(FakeSource::default().with("good", &["v1-release"]).with("flaky", &[]));
        let coordinator = RefreshCoordinator::new(store.clone(), source.clone());

        assert_eq!(
            coordinator.refresh(at(0, 0)).await,
            RefreshOutcome::Applied { updated: 2, failed: 0 }
        );
        let after_first = store.snapshot();

        assert_eq!(
            coordinator.refresh(at(4, 59)).await,
            RefreshOutcome::Skipped(SkipReason::Cooldown)
        );
        assert_eq!(*store.snapshot(), *after_first);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        assert!(matches!(coordinator.refresh(at(5, 0)).await, RefreshOutcome::Applied { .. }));
    }

    #[tokio::test]
    async fn failing_repository_keeps_previous_versions() {
        let previous = RepositoryVersions {
            beta: Some(Version { name: "v0.1-beta".into(), ..Default::default() }),
            ..Default::default()
        };
        let store = two_repo_store(previous.clone());
        let source = Arc::new(FakeSource::default().with("good", &["v1-release", "v1-alpha"]));
        let coordinator = RefreshCoordinator::new(store.clone(), source);

        let outcome = coordinator.refresh(at(0, 0)).await;
        assert_eq!(outcome, RefreshOutcome::Applied { updated: 1, failed: 1 });

        let snapshot = store.snapshot();
        assert_eq!(snapshot.find_repository("org", "flaky").unwrap().versions, previous);
        let good = &snapshot.find_repository("org", "good").unwrap().versions;
        assert_eq!(good.release.as_ref().unwrap().name, "v1-release");
        assert_eq!(good.alpha.as_ref().unwrap().name, "v1-alpha");
    }

    #[tokio::test]
    async fn pass_that_fails_everywhere_still_starts_cooldown() {
        let store = two_repo_store(RepositoryVersions::default());
        let coordinator = RefreshCoordinator::new(store.clone(), Arc::new(FakeSource::default()));

        assert_eq!(
            coordinator.refresh(at(0, 0)).await,
            RefreshOutcome::Applied { updated: 0, failed: 2 }
        );
        assert_eq!(coordinator.last_refresh_at(), Some(at(0, 0)));
        assert_eq!(
            coordinator.refresh(at(1, 0)).await,
            RefreshOutcome::Skipped(SkipReason::Cooldown)
        );
    }

    #[tokio::test]
    async fn concurrent_refreshes_apply_once() {
        let store = two_repo_store(RepositoryVersions::default());
        let source = Arc::new(FakeSource::default().with("good", &["v1-release"]).with("flaky", &[]));
        let coordinator = Arc::new(RefreshCoordinator::new(store, source.clone()));

        let now = at(0, 0);
        let (a, b) = tokio::join!(coordinator.refresh(now), coordinator.refresh(now));
        let applied = [a, b]
            .iter()
            .filter(|o| matches!(o, RefreshOutcome::Applied { .. }))
            .count();
        assert_eq!(applied, 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn custom_cooldown_is_honoured() {
        let store = two_repo_store(RepositoryVersions::default());
        let coordinator = RefreshCoordinator::with_cooldown(
            store,
            Arc::new(FakeSource::default()),
            Duration::from_secs(10),
        );
        coordinator.refresh(at(0, 0)).await;
        assert!(matches!(coordinator.refresh(at(0, 10)).await, RefreshOutcome::Applied { .. }));
    }

    /// Blocks inside `list_releases` until a permit is added.
    struct StalledSource {
        entered: tokio::sync::Notify,
        release: tokio::sync::Semaphore,
    }

    impl StalledSource {
        fn new() -> Self {
            Self { entered: tokio::sync::Notify::new(), release: tokio::sync::Semaphore::new(0) }
        }
    }

    #[async_trait]
    impl ReleaseSource for StalledSource {
        async fn list_releases(&self, _owner: &str, _repo: &str) -> Result<Vec<RawRelease>, CatalogError> {
            self.entered.notify_one();
            self.release.acquire().await.unwrap().forget();
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn last_refresh_at_is_readable_during_a_pass() {
        let store = two_repo_store(RepositoryVersions::default());
        let source = Arc::new(StalledSource::new());
        let coordinator = Arc::new(RefreshCoordinator::new(store, source.clone()));
        assert_eq!(coordinator.last_refresh_at(), None);

        let running = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.refresh(at(0, 0)).await }
        });
        source.entered.notified().await;

        assert_eq!(coordinator.last_refresh_at(), Some(at(0, 0)));
        assert!(!running.is_finished());

        source.release.add_permits(2);
        assert_eq!(
            running.await.unwrap(),
            RefreshOutcome::Applied { updated: 2, failed: 0 }
        );
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn upstream_failure_is_logged() {
        let store = two_repo_store(RepositoryVersions::default());
        let coordinator = RefreshCoordinator::new(store, Arc::new(FakeSource::default()));
        coordinator.refresh(at(0, 0)).await;
        assert!(logs_contain("keeping previous versions"));
    }
}
