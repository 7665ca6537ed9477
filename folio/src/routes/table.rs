//! Ordered route table with a single catch-all entry.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use super::{LoadError, RouteId, RouteTableError};
use crate::pages::Page;

/// Pattern string reserved for the catch-all entry.
pub const CATCH_ALL: &str = "*";

/// Future produced by a route loader.
pub type PageFuture = BoxFuture<'static, Result<Arc<dyn Page>, LoadError>>;

/// Deferred page module reference.
///
/// Calling the loader starts a resolution. The module cache guarantees it is
/// called at most once per route.
pub type Loader = Arc<dyn Fn() -> PageFuture + Send + Sync>;

/// Path pattern of a route entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoutePattern {
    /// Matches one path by string equality.
    Literal(String),
    /// Matches any path.
    CatchAll,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern == CATCH_ALL {
            RoutePattern::CatchAll
        } else {
            RoutePattern::Literal(pattern.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RoutePattern::Literal(path) => path,
            RoutePattern::CatchAll => CATCH_ALL,
        }
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self, RoutePattern::CatchAll)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One binding of a path pattern to a deferred page module.
#[derive(Clone)]
pub struct RouteEntry {
    id: RouteId,
    pattern: RoutePattern,
    label: String,
    exact: bool,
    loader: Loader,
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("label", &self.label)
            .field("exact", &self.exact)
            .finish_non_exhaustive()
    }
}

impl RouteEntry {
    /// Create an entry whose module is produced by `loader`.
    pub fn new<F, Fut>(id: RouteId, pattern: &str, label: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<dyn Page>, LoadError>> + Send + 'static,
    {
        Self {
            id,
            pattern: RoutePattern::parse(pattern),
            label: label.into(),
            exact: false,
            loader: Arc::new(move || loader().boxed()),
        }
    }

    /// Require strict equality with the request path.
    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// Start a new resolution of this entry's module.
    ///
    /// Bypasses memoization; go through [`ModuleCache`](super::ModuleCache)
    /// unless a fresh module is wanted.
    pub fn load(&self) -> PageFuture {
        (self.loader)()
    }

    /// Whether this entry matches `path`.
    ///
    /// Literal patterns compare by string equality whether or not the entry
    /// is exact; there is no prefix matching.
    pub fn matches(&self, path: &str) -> bool {
        match &self.pattern {
            RoutePattern::CatchAll => true,
            RoutePattern::Literal(pattern) => pattern == path,
        }
    }
}

/// Read-only, ordered sequence of route entries.
///
/// Invariants established by [`RouteTable::new`]:
/// - exactly one catch-all entry, and it is last
/// - patterns and ids are unique
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Validate and build a table from entries in declaration order.
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self, RouteTableError> {
        let catch_all: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.pattern.is_catch_all())
            .map(|(i, _)| i)
            .collect();

        match catch_all.as_slice() {
            [] => return Err(RouteTableError::MissingCatchAll),
            [position] if *position != entries.len() - 1 => {
                return Err(RouteTableError::CatchAllNotLast {
                    position: *position,
                    len: entries.len(),
                })
            }
            [_] => {}
            many => return Err(RouteTableError::MultipleCatchAll { count: many.len() }),
        }

        let mut patterns = HashSet::new();
        let mut ids = HashSet::new();
        for entry in &entries {
            if !patterns.insert(entry.pattern.as_str()) {
                return Err(RouteTableError::DuplicatePattern(
                    entry.pattern.as_str().to_string(),
                ));
            }
            if !ids.insert(entry.id) {
                return Err(RouteTableError::DuplicateId(entry.id));
            }
        }

        Ok(Self { entries })
    }

    /// Pick the entry for `path`: first match in declaration order.
    ///
    /// Never fails; the catch-all matches anything earlier entries don't.
    pub fn resolve(&self, path: &str) -> &RouteEntry {
        self.entries
            .iter()
            .find(|entry| entry.matches(path))
            .unwrap_or_else(|| self.catch_all())
    }

    /// Typed access to a named route.
    pub fn get(&self, id: RouteId) -> Option<&RouteEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// The fallback entry.
    pub fn catch_all(&self) -> &RouteEntry {
        // Construction guarantees a non-empty table ending in the catch-all.
        &self.entries[self.entries.len() - 1]
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Entries suitable for navigation UI (everything but the catch-all).
    pub fn navigation(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter().filter(|e| !e.pattern.is_catch_all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::NotFoundPage;

    fn entry(id: RouteId, pattern: &str) -> RouteEntry {
        RouteEntry::new(id, pattern, id.as_str(), || async {
            Ok::<_, LoadError>(Arc::new(NotFoundPage) as Arc<dyn Page>)
        })
    }

    fn table() -> RouteTable {
        RouteTable::new(vec![
            entry(RouteId::Home, "/").exact(),
            entry(RouteId::About, "/about"),
            entry(RouteId::NotFound, "*"),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_declared_paths() {
        let table = table();
        assert_eq!(table.resolve("/").id(), RouteId::Home);
        assert_eq!(table.resolve("/about").id(), RouteId::About);
    }

    #[test]
    fn test_resolve_has_no_prefix_semantics() {
        let table = table();
        assert_eq!(table.resolve("/about/team").id(), RouteId::NotFound);
        assert_eq!(table.resolve("/about/").id(), RouteId::NotFound);
        assert_eq!(table.resolve("").id(), RouteId::NotFound);
    }

    #[test]
    fn test_get_by_id() {
        let table = table();
        assert_eq!(table.get(RouteId::About).unwrap().pattern().as_str(), "/about");
        assert!(table.get(RouteId::Gallery).is_none());
    }

    #[test]
    fn test_navigation_excludes_catch_all() {
        let table = table();
        let labels: Vec<_> = table.navigation().map(|e| e.label()).collect();
        assert_eq!(labels, vec!["home", "about"]);
    }

    #[test]
    fn test_rejects_missing_catch_all() {
        let err = RouteTable::new(vec![entry(RouteId::Home, "/")]).unwrap_err();
        assert_eq!(err, RouteTableError::MissingCatchAll);

        let err = RouteTable::new(Vec::new()).unwrap_err();
        assert_eq!(err, RouteTableError::MissingCatchAll);
    }

    #[test]
    fn test_rejects_catch_all_not_last() {
        let err = RouteTable::new(vec![
            entry(RouteId::NotFound, "*"),
            entry(RouteId::Home, "/"),
        ])
        .unwrap_err();
        assert_eq!(err, RouteTableError::CatchAllNotLast { position: 0, len: 2 });
    }

    #[test]
    fn test_rejects_multiple_catch_all() {
        let err = RouteTable::new(vec![
            entry(RouteId::NotFound, "*"),
            entry(RouteId::Home, "*"),
        ])
        .unwrap_err();
        assert_eq!(err, RouteTableError::MultipleCatchAll { count: 2 });
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = RouteTable::new(vec![
            entry(RouteId::Home, "/"),
            entry(RouteId::About, "/"),
            entry(RouteId::NotFound, "*"),
        ])
        .unwrap_err();
        assert_eq!(err, RouteTableError::DuplicatePattern("/".to_string()));

        let err = RouteTable::new(vec![
            entry(RouteId::Home, "/"),
            entry(RouteId::Home, "/home"),
            entry(RouteId::NotFound, "*"),
        ])
        .unwrap_err();
        assert_eq!(err, RouteTableError::DuplicateId(RouteId::Home));
    }
}
