//! Visibility detection: `Pending -> Visible` once an element crosses its
//! viewport threshold.
//!
//! The host's intersection facility sits behind [`VisibilitySource`]. The
//! detector owns the per-element state machine and applies the batches the
//! source reports, so the same logic runs against `IntersectionObserver` in
//! the browser and against [`ManualSource`] in tests.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::env::MotionPreference;
use crate::error::SourceError;
use crate::ids::ElementId;

/// Ratios reported by hosts land a hair under the configured threshold.
const RATIO_EPSILON: f64 = 1e-4;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VisibilityState {
    #[default]
    Pending,
    Visible,
}

impl VisibilityState {
    #[inline]
    pub fn is_visible(self) -> bool {
        matches!(self, VisibilityState::Visible)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ObserveMode {
    /// Fire once, then stop observing.
    #[default]
    Once,
    /// Toggle on every threshold crossing.
    Repeat,
}

/// One intersection report from the host.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    pub element: ElementId,
    pub is_intersecting: bool,
    /// Visible fraction of the element, `0..=1`.
    pub ratio: f64,
}

impl IntersectionEntry {
    pub fn new(element: ElementId, is_intersecting: bool, ratio: f64) -> Self {
        Self {
            element,
            is_intersecting,
            ratio,
        }
    }

    fn crosses(&self, threshold: f32) -> bool {
        self.is_intersecting && self.ratio + RATIO_EPSILON >= threshold as f64
    }
}

/// Host viewport-intersection facility.
pub trait VisibilitySource {
    /// `false` when the host has no intersection capability at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Start reporting intersections of `element` at `threshold`.
    fn observe(&mut self, element: ElementId, threshold: f32) -> Result<(), SourceError>;

    /// Stop reporting `element`. Must tolerate unknown elements.
    fn unobserve(&mut self, element: ElementId);

    /// Entries reported since the last drain, in arrival order.
    fn drain(&mut self) -> Vec<IntersectionEntry>;
}

/// Manually driven source. Tests push entries; hosts that compute
/// intersections themselves can do the same.
#[derive(Debug, Default)]
pub struct ManualSource {
    supported: bool,
    observed: HashMap<ElementId, f32>,
    queue: Vec<IntersectionEntry>,
}

impl ManualSource {
    pub fn new() -> Self {
        Self {
            supported: true,
            ..Self::default()
        }
    }

    /// A source reporting no intersection capability.
    pub fn unsupported() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: IntersectionEntry) {
        self.queue.push(entry);
    }

    /// Report `element` intersecting with the given visible fraction.
    pub fn enter(&mut self, element: ElementId, ratio: f64) {
        self.push(IntersectionEntry::new(element, true, ratio));
    }

    /// Report `element` fully outside the viewport.
    pub fn leave(&mut self, element: ElementId) {
        self.push(IntersectionEntry::new(element, false, 0.0));
    }

    pub fn is_observing(&self, element: ElementId) -> bool {
        self.observed.contains_key(&element)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }
}

impl VisibilitySource for ManualSource {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn observe(&mut self, element: ElementId, threshold: f32) -> Result<(), SourceError> {
        if !self.supported {
            return Err(SourceError::Unsupported);
        }
        self.observed.insert(element, threshold);
        Ok(())
    }

    fn unobserve(&mut self, element: ElementId) {
        self.observed.remove(&element);
    }

    fn drain(&mut self) -> Vec<IntersectionEntry> {
        std::mem::take(&mut self.queue)
    }
}

/// Why an element was marked visible without observation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fallback {
    ReducedMotion,
    Unsupported,
}

/// Result of [`VisibilityDetector::observe`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Registration {
    pub state: VisibilityState,
    /// `false` when the element was already observed; nothing changed.
    pub fresh: bool,
    pub fallback: Option<Fallback>,
}

/// A state transition applied during [`VisibilityDetector::poll`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VisibilityChange {
    pub element: ElementId,
    pub state: VisibilityState,
}

#[derive(Debug)]
struct Observation {
    threshold: f32,
    mode: ObserveMode,
    state: VisibilityState,
    /// Still registered with the source.
    registered: bool,
}

/// Per-element visibility state machines over one [`VisibilitySource`].
#[derive(Debug)]
pub struct VisibilityDetector<S: VisibilitySource> {
    source: S,
    observations: HashMap<ElementId, Observation>,
    reduced_motion: bool,
}

impl<S: VisibilitySource> VisibilityDetector<S> {
    pub fn new(source: S, motion: &impl MotionPreference) -> Self {
        Self {
            source,
            observations: HashMap::new(),
            reduced_motion: motion.prefers_reduced_motion(),
        }
    }

    /// Update the reduced-motion preference for future registrations.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Begin observing `element`. Observing an element twice is a no-op that
    /// reports its current state.
    pub fn observe(
        &mut self,
        element: ElementId,
        threshold: f32,
        mode: ObserveMode,
        respect_reduced_motion: bool,
    ) -> Registration {
        if let Some(existing) = self.observations.get(&element) {
            return Registration {
                state: existing.state,
                fresh: false,
                fallback: None,
            };
        }

        let fallback = if respect_reduced_motion && self.reduced_motion {
            log::debug!("visibility {element}: reduced motion, visible immediately");
            Some(Fallback::ReducedMotion)
        } else if !self.source.is_supported() {
            log::warn!("visibility {element}: no intersection support, visible immediately");
            Some(Fallback::Unsupported)
        } else {
            match self.source.observe(element, threshold) {
                Ok(()) => None,
                Err(err) => {
                    log::warn!("visibility {element}: {err}; visible immediately");
                    Some(Fallback::Unsupported)
                }
            }
        };

        let state = if fallback.is_some() {
            VisibilityState::Visible
        } else {
            VisibilityState::Pending
        };
        self.observations.insert(
            element,
            Observation {
                threshold,
                mode,
                state,
                registered: fallback.is_none(),
            },
        );
        Registration {
            state,
            fresh: true,
            fallback,
        }
    }

    pub fn state(&self, element: ElementId) -> Option<VisibilityState> {
        self.observations.get(&element).map(|o| o.state)
    }

    pub fn is_visible(&self, element: ElementId) -> bool {
        self.state(element).is_some_and(VisibilityState::is_visible)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Drain the source and apply transitions. Returns changes in the order
    /// they were applied.
    pub fn poll(&mut self) -> Vec<VisibilityChange> {
        let entries = self.source.drain();
        let mut changes = Vec::new();
        for entry in entries {
            let Some(obs) = self.observations.get_mut(&entry.element) else {
                continue;
            };
            let crossed = entry.crosses(obs.threshold);
            match obs.mode {
                ObserveMode::Once => {
                    if !crossed || obs.state.is_visible() {
                        continue;
                    }
                    obs.state = VisibilityState::Visible;
                    if obs.registered {
                        obs.registered = false;
                        self.source.unobserve(entry.element);
                    }
                }
                ObserveMode::Repeat => {
                    let next = if crossed {
                        VisibilityState::Visible
                    } else {
                        VisibilityState::Pending
                    };
                    if next == obs.state {
                        continue;
                    }
                    obs.state = next;
                }
            }
            log::debug!("visibility {}: {:?}", entry.element, obs.state);
            changes.push(VisibilityChange {
                element: entry.element,
                state: obs.state,
            });
        }
        changes
    }

    /// Stop observing `element` and forget it. Returns `false` if unknown.
    pub fn release(&mut self, element: ElementId) -> bool {
        match self.observations.remove(&element) {
            Some(obs) => {
                if obs.registered {
                    self.source.unobserve(element);
                }
                true
            }
            None => false,
        }
    }

    /// Release every observation.
    pub fn release_all(&mut self) {
        for (element, obs) in self.observations.drain() {
            if obs.registered {
                self.source.unobserve(element);
            }
        }
    }
}

impl<S: VisibilitySource> Drop for VisibilityDetector<S> {
    fn drop(&mut self) {
        self.release_all();
    }
}
