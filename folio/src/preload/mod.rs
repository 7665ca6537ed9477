//! Visibility-triggered preloading.
//!
//! A [`PreloadTrigger`] watches one anchor (typically a navigation link) and
//! fires a caller-supplied action the first time the anchor becomes visible.
//! The trigger only defines *when* to preload; wiring the action to
//! [`SiteRouter::preload`](crate::routes::SiteRouter::preload) is up to the
//! caller.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio::preload::{AnchorId, ObserverOptions, PreloadTrigger, Rect, ViewportObserver};
//! use folio::routes::RouteId;
//!
//! let observer = Arc::new(ViewportObserver::new(1280.0, 720.0));
//! observer.place(AnchorId(1), Rect::new(0.0, 2000.0, 120.0, 24.0));
//!
//! let preload_router = router.clone();
//! let mut trigger = PreloadTrigger::new(
//!     RouteId::Gallery,
//!     ObserverOptions::default().with_root_margin("200px".parse()?),
//!     move |route| { preload_router.preload(route); },
//! )?;
//! trigger.mount(AnchorId(1), observer.clone())?;
//!
//! observer.scroll_to(0.0, 1200.0);
//! for (_, entry) in observer.entries() {
//!     trigger.handle_entry(&entry);
//! }
//! ```

mod geometry;
mod trigger;
mod viewport;

pub use geometry::{IntersectionEntry, MarginValue, Rect, RootMargin};
pub use trigger::{AnchorId, IntersectionObserver, ObserverOptions, PreloadState, PreloadTrigger};
pub use viewport::ViewportObserver;

use thiserror::Error;

/// Errors from configuring or driving a preload trigger.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PreloadError {
    /// Threshold outside `0.0..=1.0`.
    #[error("threshold must be between 0 and 1, got {0}")]
    InvalidThreshold(f64),

    /// Root margin string could not be parsed.
    #[error("invalid root margin: {0:?}")]
    InvalidRootMargin(String),

    /// Operation not allowed in the trigger's current state.
    #[error("cannot {action} a trigger in state {from:?}")]
    InvalidTransition {
        from: PreloadState,
        action: &'static str,
    },
}
