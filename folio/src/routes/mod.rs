//! Route table, module cache, and navigation.
//!
//! # Architecture
//!
//! ```text
//! request path ──► RouteTable::resolve ──► RouteEntry ──► ModuleCache::load ──► Arc<dyn Page>
//!                  (first match wins,       (deferred      (one shared future
//!                   catch-all last)          loader)        per route, memoized)
//!
//! PreloadTrigger ──► SiteRouter::preload ──► ModuleCache::load (warm only)
//! ```
//!
//! The [`SiteRouter`] composes the table and the cache. Navigation always
//! yields a [`RenderOutcome`]: the resolved page, the catch-all fallback, or
//! the error boundary's view when a module failed to resolve.

mod cache;
mod error;
mod router;
mod table;

use std::fmt;
use std::sync::Arc;

pub use cache::{ModuleCache, ModuleStatus};
pub use error::{LoadError, RouteTableError};
pub use router::{RenderOutcome, SiteRouter};
pub use table::{Loader, PageFuture, RouteEntry, RoutePattern, RouteTable};

use crate::pages::{AboutPage, ContactPage, GalleryPage, HomePage, NotFoundPage, Page, SiteContext};

/// Typed identifier for every route the site declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteId {
    Home,
    About,
    Gallery,
    Contact,
    NotFound,
}

impl RouteId {
    /// All identifiers in declaration order.
    pub fn all() -> &'static [RouteId] {
        &[
            RouteId::Home,
            RouteId::About,
            RouteId::Gallery,
            RouteId::Contact,
            RouteId::NotFound,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteId::Home => "home",
            RouteId::About => "about",
            RouteId::Gallery => "gallery",
            RouteId::Contact => "contact",
            RouteId::NotFound => "not-found",
        }
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the site's route table.
///
/// Each loader builds its page from `ctx` on first use. The gallery loader
/// touches the filesystem and is the one that can fail at runtime.
pub fn site_routes(ctx: SiteContext) -> Result<RouteTable, RouteTableError> {
    let ctx = Arc::new(ctx);

    let home_ctx = Arc::clone(&ctx);
    let about_ctx = Arc::clone(&ctx);
    let gallery_ctx = Arc::clone(&ctx);
    let contact_ctx = Arc::clone(&ctx);

    let entries = vec![
        RouteEntry::new(RouteId::Home, "/", "Home", move || {
            let page: Arc<dyn Page> = Arc::new(HomePage::new(&home_ctx));
            async move { Ok::<_, LoadError>(page) }
        })
        .exact(),
        RouteEntry::new(RouteId::About, "/about", "About", move || {
            let page: Arc<dyn Page> = Arc::new(AboutPage::new(&about_ctx));
            async move { Ok::<_, LoadError>(page) }
        }),
        RouteEntry::new(RouteId::Gallery, "/gallery", "Gallery", move || {
            let ctx = Arc::clone(&gallery_ctx);
            async move {
                let dir = ctx.gallery_dir();
                match GalleryPage::scan(&ctx.name, &dir).await {
                    Ok(page) => Ok(Arc::new(page) as Arc<dyn Page>),
                    Err(e) => Err(LoadError::io(RouteId::Gallery, &dir, &e)),
                }
            }
        }),
        RouteEntry::new(RouteId::Contact, "/contact", "Contact", move || {
            let page: Arc<dyn Page> = Arc::new(ContactPage::new(&contact_ctx));
            async move { Ok::<_, LoadError>(page) }
        }),
        RouteEntry::new(RouteId::NotFound, "*", "Not Found", || async {
            Ok::<_, LoadError>(Arc::new(NotFoundPage) as Arc<dyn Page>)
        }),
    ];

    RouteTable::new(entries)
}
