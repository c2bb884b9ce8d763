//! Snapshot-publishing catalog store.

use std::sync::{Arc, PoisonError, RwLock};

use crate::model::Catalog;

/// Holds the current catalog as an immutable, shared snapshot.
///
/// Readers clone the `Arc` under a momentary read lock and never observe a
/// half-applied refresh: [`CatalogStore::apply_refresh`] builds a complete
/// new catalog and swaps it in.
#[derive(Debug)]
pub struct CatalogStore {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// The catalog as of the last published refresh.
    pub fn snapshot(&self) -> Arc<Catalog> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Apply `mutator` to a copy of the current catalog and publish the
    /// result.
    pub fn apply_refresh<F>(&self, mutator: F)
    where
        F: FnOnce(&mut Catalog),
    {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Catalog::clone(&**guard);
        mutator(&mut next);
        *guard = Arc::new(next);
    }
}
