//! Renderable page modules.
//!
//! Every route in the site table resolves to something implementing [`Page`].
//! Pages produce HTML fragments; the surrounding document (head, navigation)
//! is assembled by [`layout::render_document`].
//!
//! # Page Modules
//!
//! | Page | Route | Data source |
//! |------|-------|-------------|
//! | [`HomePage`] | `/` | site context |
//! | [`AboutPage`] | `/about` | site context |
//! | [`GalleryPage`] | `/gallery` | `<public_dir>/gallery` scanned on load |
//! | [`ContactPage`] | `/contact` | site context |
//! | [`NotFoundPage`] | `*` | none |
//!
//! [`ErrorView`] is not bound to a route; the error boundary renders it when
//! a page module fails to resolve.

mod content;
mod gallery;
pub mod html;
pub mod layout;

use std::path::PathBuf;

pub use content::{AboutPage, ContactPage, ErrorView, HomePage, NotFoundPage};
pub use gallery::{GalleryItem, GalleryPage};

use crate::config::ConfigFile;

/// A renderable unit bound to a route.
///
/// Implementations must be cheap to share: the module cache hands out
/// `Arc<dyn Page>` to every navigation that hits the same route.
pub trait Page: Send + Sync {
    /// Document title for this page.
    fn title(&self) -> &str;

    /// Render the page body as an HTML fragment.
    fn render(&self) -> String;
}

/// Static site facts shared by all page modules.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteContext {
    /// Owner name shown in headings and titles.
    pub name: String,
    /// One-line description shown on the home page.
    pub tagline: String,
    /// Contact address.
    pub email: String,
    /// Directory holding static assets (`gallery/`, favicons, sitemap).
    pub public_dir: PathBuf,
}

impl SiteContext {
    /// Build the context from the loaded configuration file.
    pub fn from_config(config: &ConfigFile) -> Self {
        Self {
            name: config.site.name.clone(),
            tagline: config.site.tagline.clone(),
            email: config.site.email.clone(),
            public_dir: config.assets.public_dir.clone(),
        }
    }

    /// Directory scanned by the gallery page.
    pub fn gallery_dir(&self) -> PathBuf {
        self.public_dir.join("gallery")
    }
}

impl Default for SiteContext {
    fn default() -> Self {
        Self::from_config(&ConfigFile::default())
    }
}
