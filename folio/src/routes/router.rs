//! Route resolution and the error boundary.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{LoadError, ModuleCache, RouteEntry, RouteId, RouteTable};
use crate::pages::layout::NavLink;
use crate::pages::{ErrorView, Page};

/// Result of a navigation, ready to render.
#[derive(Clone)]
pub enum RenderOutcome {
    /// A declared route resolved its module.
    Rendered { route: RouteId, page: Arc<dyn Page> },
    /// No declared route matched; the catch-all rendered.
    Fallback { route: RouteId, page: Arc<dyn Page> },
    /// The route's module failed to load; the error boundary took over.
    Failed { route: RouteId, error: LoadError, view: ErrorView },
}

impl std::fmt::Debug for RenderOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rendered { route, page } => f
                .debug_struct("Rendered")
                .field("route", route)
                .field("title", &page.title())
                .finish(),
            Self::Fallback { route, page } => f
                .debug_struct("Fallback")
                .field("route", route)
                .field("title", &page.title())
                .finish(),
            Self::Failed { route, error, .. } => f
                .debug_struct("Failed")
                .field("route", route)
                .field("error", error)
                .finish(),
        }
    }
}

impl RenderOutcome {
    pub fn route(&self) -> RouteId {
        match self {
            Self::Rendered { route, .. } | Self::Fallback { route, .. } | Self::Failed { route, .. } => {
                *route
            }
        }
    }

    /// The page to render, the error view included.
    pub fn page(&self) -> &dyn Page {
        match self {
            Self::Rendered { page, .. } | Self::Fallback { page, .. } => page.as_ref(),
            Self::Failed { view, .. } => view,
        }
    }

    /// HTTP status matching the outcome.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Rendered { .. } => 200,
            Self::Fallback { .. } => 404,
            Self::Failed { .. } => 500,
        }
    }
}

/// Catch module load failures and turn them into the error view.
///
/// Failures are reported once here and never retried.
fn error_boundary(entry: &RouteEntry, path: &str, error: LoadError) -> RenderOutcome {
    warn!(route = %entry.id(), path, error = %error, "Page module failed to load");
    RenderOutcome::Failed {
        route: entry.id(),
        view: ErrorView::new(error.to_string(), path),
        error,
    }
}

/// Route table plus its module cache.
///
/// Cheap to clone; clones share the same cache.
#[derive(Debug, Clone)]
pub struct SiteRouter {
    table: Arc<RouteTable>,
    cache: Arc<ModuleCache>,
}

impl SiteRouter {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table: Arc::new(table),
            cache: Arc::new(ModuleCache::new()),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    /// Resolve `path` and load its module, suspending until it resolves.
    pub async fn navigate(&self, path: &str) -> RenderOutcome {
        let entry = self.table.resolve(path);
        debug!(path, route = %entry.id(), "Navigating");

        match self.cache.load(entry).await {
            Ok(page) if entry.pattern().is_catch_all() => RenderOutcome::Fallback {
                route: entry.id(),
                page,
            },
            Ok(page) => RenderOutcome::Rendered {
                route: entry.id(),
                page,
            },
            Err(error) => error_boundary(entry, path, error),
        }
    }

    /// Load a named route's module directly.
    pub async fn load(&self, id: RouteId) -> Option<Result<Arc<dyn Page>, LoadError>> {
        let entry = self.table.get(id)?;
        Some(self.cache.load(entry).await)
    }

    /// Warm `id`'s module in the background.
    ///
    /// Returns `false` if the route is unknown or there is no runtime to
    /// spawn on. Failures are memoized and surface on navigation.
    pub fn preload(&self, id: RouteId) -> bool {
        if self.table.get(id).is_none() {
            return false;
        }
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(route = %id, "Preload requested outside a runtime, skipping");
                return false;
            }
        };

        let router = self.clone();
        handle.spawn(async move {
            if let Some(Err(e)) = router.load(id).await {
                debug!(route = %id, error = %e, "Preload failed");
            }
        });
        debug!(route = %id, "Preload started");
        true
    }

    /// Manual retry: forget a memoized failure for `id`.
    ///
    /// Successful modules are left alone.
    pub fn reload(&self, id: RouteId) -> bool {
        if self.cache.status(id) == super::ModuleStatus::Failed {
            return self.cache.invalidate(id);
        }
        false
    }

    /// Navigation links for every declared route, marking `active`.
    pub fn nav_links(&self, active: RouteId) -> Vec<NavLink> {
        self.table
            .navigation()
            .map(|entry| NavLink {
                href: entry.pattern().as_str().to_string(),
                label: entry.label().to_string(),
                active: entry.id() == active,
            })
            .collect()
    }
}
