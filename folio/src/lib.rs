//! Folio - portfolio site runtime and asset toolchain
//!
//! This library serves a small portfolio site (home, about, gallery,
//! contact) from a declarative route table with lazily loaded, memoized page
//! modules, and provides the build-time tools that prepare its static
//! assets.
//!
//! # Modules
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`routes`] | route table, module cache, navigation and error boundary |
//! | [`pages`] | page modules and the HTML document shell |
//! | [`preload`] | one-shot visibility-triggered preloading |
//! | [`page_state`] | load-state controller for page-owned async work |
//! | [`health`] | health-check payloads |
//! | [`server`] | axum front end |
//! | [`assets`] | favicon, sitemap, video and upload tools |
//! | [`config`] | INI configuration |
//! | [`logging`] | tracing subscriber setup |

pub mod assets;
pub mod config;
pub mod health;
pub mod logging;
pub mod page_state;
pub mod pages;
pub mod preload;
pub mod routes;
pub mod server;

/// Crate version, reported by the health check.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
