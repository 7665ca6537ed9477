//! Process-wide memoization of page module resolution.
//!
//! The cache is a keyed store from [`RouteId`] to a single shared future.
//! The first request for a route calls its loader and stores the future;
//! every later or concurrent request awaits that same future, so a route's
//! loader runs at most once for the lifetime of the cache.
//!
//! Failures are memoized like successes: a failed module stays failed until
//! [`ModuleCache::invalidate`] is called (the error view's manual reload).
//! Nothing is ever evicted otherwise; the route set is static and small.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::{FutureExt, Shared};
use tracing::{debug, info};

use super::{LoadError, PageFuture, RouteEntry, RouteId};
use crate::pages::Page;

type SharedPage = Shared<PageFuture>;

/// Resolution state of one route's module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    /// No navigation or preload has asked for the module yet.
    NotRequested,
    /// A resolution is in flight.
    Pending,
    /// The module resolved and is memoized.
    Resolved,
    /// The resolution failed; the failure is memoized.
    Failed,
}

/// Keyed store of single-resolution page futures.
pub struct ModuleCache {
    modules: DashMap<RouteId, SharedPage>,
    /// Number of loader invocations, for diagnostics.
    fetches: AtomicU64,
}

impl std::fmt::Debug for ModuleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleCache")
            .field("modules", &self.modules.len())
            .field("fetches", &self.fetches.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for ModuleCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            modules: DashMap::new(),
            fetches: AtomicU64::new(0),
        }
    }

    /// Resolve `entry`'s module, starting the loader only if no resolution
    /// exists yet.
    pub async fn load(&self, entry: &RouteEntry) -> Result<Arc<dyn Page>, LoadError> {
        let shared = self.shared_for(entry);
        shared.await
    }

    /// Get or create the shared future for `entry`.
    ///
    /// The map guard is released before returning so awaiting never holds a
    /// shard lock.
    fn shared_for(&self, entry: &RouteEntry) -> SharedPage {
        self.modules
            .entry(entry.id())
            .or_insert_with(|| {
                let fetch = self.fetches.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(route = %entry.id(), fetch, "Starting page module resolution");
                entry.load().shared()
            })
            .value()
            .clone()
    }

    /// Current resolution state of `id`.
    pub fn status(&self, id: RouteId) -> ModuleStatus {
        match self.modules.get(&id) {
            None => ModuleStatus::NotRequested,
            Some(shared) => match shared.peek() {
                None => ModuleStatus::Pending,
                Some(Ok(_)) => ModuleStatus::Resolved,
                Some(Err(_)) => ModuleStatus::Failed,
            },
        }
    }

    /// Drop the memoized resolution of `id` so the next load calls the
    /// loader again. Returns whether an entry was removed.
    pub fn invalidate(&self, id: RouteId) -> bool {
        let removed = self.modules.remove(&id).is_some();
        if removed {
            info!(route = %id, "Invalidated memoized page module");
        }
        removed
    }

    /// Total loader invocations since the cache was created.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Number of routes with a memoized or pending resolution.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
