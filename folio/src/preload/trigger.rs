//! One-shot visibility preload trigger.
//!
//! # State Machine
//!
//! ```text
//! Unarmed --[mount]--> Observing --[entry meets threshold]--> Triggered
//!    |                    |                                      |
//!    +------[teardown]----+-----------------[teardown]-----------+--> Disengaged
//! ```
//!
//! A trigger fires its preload action at most once. After firing it stops
//! observing its anchor and ignores every later entry, including re-entries
//! into the viewport. Teardown is explicit via [`PreloadTrigger::teardown`]
//! and implicit on drop, and always releases the observer.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::geometry::{IntersectionEntry, RootMargin};
use super::PreloadError;
use crate::routes::RouteId;

/// Identifies the anchor element a trigger watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(pub u64);

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}

/// Observation options for one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObserverOptions {
    /// Fraction of the anchor that must be visible, `0.0..=1.0`.
    pub threshold: f64,
    /// Adjustment of the viewport box used for the visibility test.
    pub root_margin: RootMargin,
}

impl ObserverOptions {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_root_margin(mut self, root_margin: RootMargin) -> Self {
        self.root_margin = root_margin;
        self
    }

    fn validate(&self) -> Result<(), PreloadError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(PreloadError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }

    /// Whether `entry` satisfies these options.
    pub fn is_satisfied_by(&self, entry: &IntersectionEntry) -> bool {
        entry.is_intersecting && entry.intersection_ratio >= self.threshold
    }
}

/// Host-side intersection observation.
///
/// Implemented by whatever can report anchor visibility: a browser binding,
/// or [`ViewportObserver`](super::ViewportObserver) for headless use.
pub trait IntersectionObserver: Send + Sync {
    /// Start reporting entries for `anchor`.
    fn observe(&self, anchor: AnchorId, options: &ObserverOptions);

    /// Stop reporting entries for `anchor`.
    fn unobserve(&self, anchor: AnchorId);
}

/// Lifecycle of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadState {
    /// Created, anchor not mounted yet.
    Unarmed,
    /// Anchor mounted and observed.
    Observing,
    /// Preload fired; the anchor is no longer observed.
    Triggered,
    /// Torn down.
    Disengaged,
}

type PreloadAction = Box<dyn FnOnce(RouteId) + Send>;

/// Fires a preload action the first time an anchor becomes visible.
pub struct PreloadTrigger {
    target: RouteId,
    options: ObserverOptions,
    state: PreloadState,
    binding: Option<(AnchorId, Arc<dyn IntersectionObserver>)>,
    action: Option<PreloadAction>,
}

impl fmt::Debug for PreloadTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreloadTrigger")
            .field("target", &self.target)
            .field("options", &self.options)
            .field("state", &self.state)
            .field("anchor", &self.binding.as_ref().map(|(anchor, _)| *anchor))
            .finish_non_exhaustive()
    }
}

impl PreloadTrigger {
    /// Create an unarmed trigger for `target`.
    ///
    /// `action` runs at most once, when the anchor first becomes visible.
    pub fn new<F>(target: RouteId, options: ObserverOptions, action: F) -> Result<Self, PreloadError>
    where
        F: FnOnce(RouteId) + Send + 'static,
    {
        options.validate()?;
        Ok(Self {
            target,
            options,
            state: PreloadState::Unarmed,
            binding: None,
            action: Some(Box::new(action)),
        })
    }

    pub fn target(&self) -> RouteId {
        self.target
    }

    pub fn state(&self) -> PreloadState {
        self.state
    }

    pub fn anchor(&self) -> Option<AnchorId> {
        self.binding.as_ref().map(|(anchor, _)| *anchor)
    }

    /// Bind the mounted anchor and start observing it.
    pub fn mount(
        &mut self,
        anchor: AnchorId,
        observer: Arc<dyn IntersectionObserver>,
    ) -> Result<(), PreloadError> {
        if self.state != PreloadState::Unarmed {
            return Err(PreloadError::InvalidTransition {
                from: self.state,
                action: "mount",
            });
        }

        observer.observe(anchor, &self.options);
        self.binding = Some((anchor, observer));
        self.state = PreloadState::Observing;
        debug!(route = %self.target, %anchor, "Preload trigger observing");
        Ok(())
    }

    /// Feed one intersection entry. Returns whether the preload fired.
    pub fn handle_entry(&mut self, entry: &IntersectionEntry) -> bool {
        if self.state != PreloadState::Observing {
            trace!(route = %self.target, state = ?self.state, "Ignoring entry");
            return false;
        }
        if !self.options.is_satisfied_by(entry) {
            return false;
        }

        if let Some((anchor, observer)) = &self.binding {
            observer.unobserve(*anchor);
        }
        self.state = PreloadState::Triggered;

        if let Some(action) = self.action.take() {
            debug!(
                route = %self.target,
                ratio = entry.intersection_ratio,
                "Anchor visible, firing preload"
            );
            action(self.target);
        }
        true
    }

    /// Stop observing and release the observer. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if self.state == PreloadState::Disengaged {
            return;
        }
        if let Some((anchor, observer)) = self.binding.take() {
            observer.unobserve(anchor);
        }
        self.action = None;
        debug!(route = %self.target, from = ?self.state, "Preload trigger disengaged");
        self.state = PreloadState::Disengaged;
    }
}

impl Drop for PreloadTrigger {
    fn drop(&mut self) {
        self.teardown();
    }
}
