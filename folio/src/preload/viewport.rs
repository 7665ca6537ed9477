//! Headless intersection observer driven by scroll positions.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::geometry::{IntersectionEntry, Rect};
use super::trigger::{AnchorId, IntersectionObserver, ObserverOptions};

#[derive(Debug)]
struct ViewportInner {
    viewport: Rect,
    /// Anchor boxes in document coordinates.
    anchors: HashMap<AnchorId, Rect>,
    /// Observed anchors and the options they were registered with.
    observed: HashMap<AnchorId, ObserverOptions>,
}

/// [`IntersectionObserver`] over a simulated viewport.
///
/// Anchors are placed in document coordinates, the viewport is moved with
/// [`scroll_to`](Self::scroll_to), and [`entries`](Self::entries) reports the
/// current entry of every observed anchor.
#[derive(Debug)]
pub struct ViewportObserver {
    inner: Mutex<ViewportInner>,
}

impl ViewportObserver {
    /// Create an observer with a viewport of `width` x `height` at the top
    /// of the document.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            inner: Mutex::new(ViewportInner {
                viewport: Rect::new(0.0, 0.0, width, height),
                anchors: HashMap::new(),
                observed: HashMap::new(),
            }),
        }
    }

    /// Record the layout box of `anchor`.
    pub fn place(&self, anchor: AnchorId, rect: Rect) {
        self.inner.lock().anchors.insert(anchor, rect);
    }

    /// Move the viewport's top-left corner.
    pub fn scroll_to(&self, x: f64, y: f64) {
        let mut inner = self.inner.lock();
        inner.viewport.x = x;
        inner.viewport.y = y;
    }

    pub fn is_observing(&self, anchor: AnchorId) -> bool {
        self.inner.lock().observed.contains_key(&anchor)
    }

    pub fn observed_count(&self) -> usize {
        self.inner.lock().observed.len()
    }

    /// Current entries for every observed, placed anchor, ordered by anchor.
    pub fn entries(&self) -> Vec<(AnchorId, IntersectionEntry)> {
        let inner = self.inner.lock();
        let viewport = inner.viewport;

        let mut entries: Vec<_> = inner
            .observed
            .iter()
            .filter_map(|(anchor, options)| {
                let rect = inner.anchors.get(anchor)?;
                let entry = IntersectionEntry::compute(rect, &viewport, &options.root_margin);
                Some((*anchor, entry))
            })
            .collect();
        entries.sort_by_key(|(anchor, _)| *anchor);
        entries
    }
}

impl IntersectionObserver for ViewportObserver {
    fn observe(&self, anchor: AnchorId, options: &ObserverOptions) {
        self.inner.lock().observed.insert(anchor, *options);
    }

    fn unobserve(&self, anchor: AnchorId) {
        self.inner.lock().observed.remove(&anchor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preload::RootMargin;

    #[test]
    fn test_entries_follow_scroll() {
        let observer = ViewportObserver::new(1000.0, 800.0);
        observer.place(AnchorId(1), Rect::new(0.0, 1200.0, 100.0, 40.0));
        observer.observe(AnchorId(1), &ObserverOptions::default());

        let entries = observer.entries();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].1.is_intersecting);

        observer.scroll_to(0.0, 600.0);
        assert!(observer.entries()[0].1.is_intersecting);
    }

    #[test]
    fn test_root_margin_is_per_anchor() {
        let observer = ViewportObserver::new(1000.0, 800.0);
        observer.place(AnchorId(1), Rect::new(0.0, 900.0, 100.0, 40.0));
        observer.place(AnchorId(2), Rect::new(0.0, 900.0, 100.0, 40.0));

        let wide = ObserverOptions::default().with_root_margin("200px".parse::<RootMargin>().unwrap());
        observer.observe(AnchorId(1), &wide);
        observer.observe(AnchorId(2), &ObserverOptions::default());

        let entries = observer.entries();
        assert!(entries[0].1.is_intersecting);
        assert!(!entries[1].1.is_intersecting);
    }

    #[test]
    fn test_unobserve_and_unplaced_anchors() {
        let observer = ViewportObserver::new(1000.0, 800.0);
        observer.observe(AnchorId(5), &ObserverOptions::default());
        assert!(observer.entries().is_empty());
        assert!(observer.is_observing(AnchorId(5)));

        observer.unobserve(AnchorId(5));
        assert_eq!(observer.observed_count(), 0);
    }
}
