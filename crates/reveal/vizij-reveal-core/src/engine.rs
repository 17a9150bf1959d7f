//! Engine: owns observed elements and turns visibility and frame time into
//! presentation changes.
//!
//! Methods:
//! - observe_reveal / observe_group / observe_count_up (or reserve + attach_*)
//! - release
//! - update(now_ms) -> &Outputs (poll source → apply transitions → advance counters)

use std::collections::BTreeMap;

use crate::config::Config;
use crate::count_up::{CountUp, CountUpConfig};
use crate::env::{FrameClock, MotionPreference};
use crate::error::RevealError;
use crate::ids::{ElementId, IdAllocator};
use crate::outputs::{Change, Outputs, RevealEvent};
use crate::reveal::{RevealDescriptor, StaggerItem};
use crate::visibility::{
    Fallback, Registration, VisibilityDetector, VisibilitySource, VisibilityState,
};

#[derive(Debug)]
enum Entry {
    Reveal(RevealDescriptor),
    Group { descriptor: RevealDescriptor, len: usize },
    Counter { descriptor: RevealDescriptor, counter: CountUp },
}

impl Entry {
    fn descriptor(&self) -> &RevealDescriptor {
        match self {
            Entry::Reveal(d) => d,
            Entry::Group { descriptor, .. } | Entry::Counter { descriptor, .. } => descriptor,
        }
    }
}

/// Reveal engine over one visibility source.
#[derive(Debug)]
pub struct RevealEngine<S: VisibilitySource> {
    cfg: Config,
    ids: IdAllocator,
    detector: VisibilityDetector<S>,
    // BTreeMap keeps per-update output order deterministic.
    entries: BTreeMap<ElementId, Entry>,
    /// Elements that became visible at registration, applied on next update.
    immediate: Vec<(ElementId, Option<Fallback>)>,
    outputs: Outputs,
}

impl<S: VisibilitySource> RevealEngine<S> {
    pub fn new(cfg: Config, source: S, motion: &impl MotionPreference) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            detector: VisibilityDetector::new(source, motion),
            entries: BTreeMap::new(),
            immediate: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Default descriptor from config (`scroll` section).
    pub fn default_descriptor(&self) -> RevealDescriptor {
        self.cfg.scroll.clone()
    }

    pub fn source(&self) -> &S {
        self.detector.source()
    }

    pub fn source_mut(&mut self) -> &mut S {
        self.detector.source_mut()
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.detector.set_reduced_motion(reduced);
    }

    /// Allocate an id without observing yet, so adapters can bind their node
    /// to it before the source sees it.
    pub fn reserve_element(&mut self) -> ElementId {
        self.ids.alloc_element()
    }

    pub fn observe_reveal(&mut self, descriptor: RevealDescriptor) -> Result<ElementId, RevealError> {
        let id = self.reserve_element();
        self.attach_reveal(id, descriptor)?;
        Ok(id)
    }

    pub fn observe_group(
        &mut self,
        descriptor: RevealDescriptor,
        len: usize,
    ) -> Result<ElementId, RevealError> {
        let id = self.reserve_element();
        self.attach_group(id, descriptor, len)?;
        Ok(id)
    }

    /// Observe a count-up with the configured duration and easing.
    pub fn observe_count_up(
        &mut self,
        value: &str,
        unit: &str,
        descriptor: RevealDescriptor,
    ) -> Result<ElementId, RevealError> {
        let id = self.reserve_element();
        let cfg = self.cfg.count_up.clone();
        self.attach_count_up(id, value, unit, descriptor, cfg)?;
        Ok(id)
    }

    pub fn attach_reveal(
        &mut self,
        id: ElementId,
        descriptor: RevealDescriptor,
    ) -> Result<(), RevealError> {
        self.attach(id, Entry::Reveal(descriptor))
    }

    pub fn attach_group(
        &mut self,
        id: ElementId,
        descriptor: RevealDescriptor,
        len: usize,
    ) -> Result<(), RevealError> {
        self.attach(id, Entry::Group { descriptor, len })
    }

    pub fn attach_count_up(
        &mut self,
        id: ElementId,
        value: &str,
        unit: &str,
        descriptor: RevealDescriptor,
        cfg: CountUpConfig,
    ) -> Result<(), RevealError> {
        cfg.validate()?;
        let counter = CountUp::new(value, unit, cfg);
        self.attach(id, Entry::Counter { descriptor, counter })
    }

    fn attach(&mut self, id: ElementId, entry: Entry) -> Result<(), RevealError> {
        if self.entries.contains_key(&id) {
            log::debug!("element {id} already attached; ignoring");
            return Ok(());
        }
        let d = entry.descriptor();
        d.validate()?;
        let Registration {
            state, fallback, ..
        } = self
            .detector
            .observe(id, d.threshold, d.mode, d.respect_reduced_motion);
        self.entries.insert(id, entry);
        if state.is_visible() {
            self.immediate.push((id, fallback));
        }
        Ok(())
    }

    /// Stop observing and forget `id`, cancelling any running count-up.
    /// Other elements are unaffected.
    pub fn release(&mut self, id: ElementId) -> bool {
        self.immediate.retain(|(e, _)| *e != id);
        let known = self.entries.remove(&id).is_some();
        self.detector.release(id);
        known
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self, id: ElementId) -> Option<VisibilityState> {
        self.detector.state(id)
    }

    /// Current class token of a reveal element, group container or counter.
    pub fn token(&self, id: ElementId) -> Option<String> {
        let entry = self.entries.get(&id)?;
        Some(entry.descriptor().token(self.state(id)?))
    }

    /// Presentation of child `index` of group `id`.
    pub fn group_item(&self, id: ElementId, index: usize) -> Option<StaggerItem> {
        match self.entries.get(&id)? {
            Entry::Group { descriptor, len } if index < *len => {
                Some(descriptor.item(index, self.state(id)?))
            }
            _ => None,
        }
    }

    /// Delays every child of group `id` receives once the container fires.
    pub fn group_delays(&self, id: ElementId) -> Option<Vec<u32>> {
        match self.entries.get(&id)? {
            Entry::Group { descriptor, len } => Some(descriptor.delays(*len)),
            _ => None,
        }
    }

    pub fn count_up_display(&self, id: ElementId) -> Option<String> {
        match self.entries.get(&id)? {
            Entry::Counter { counter, .. } => Some(counter.display()),
            _ => None,
        }
    }

    /// True while any counter still needs frames.
    pub fn is_animating(&self) -> bool {
        self.entries.values().any(|e| match e {
            Entry::Counter { counter, .. } => counter.is_animating(),
            _ => false,
        })
    }

    /// Update using a timestamp from `clock`.
    pub fn step(&mut self, clock: &impl FrameClock) -> &Outputs {
        self.update(clock.now_ms())
    }

    /// Apply pending visibility reports and advance counters to `now_ms`.
    pub fn update(&mut self, now_ms: f64) -> &Outputs {
        self.outputs.clear();

        for (id, fallback) in std::mem::take(&mut self.immediate) {
            if let Some(fallback) = fallback {
                self.outputs
                    .push_event(RevealEvent::Degraded { element: id, fallback });
            }
            let reduced = fallback == Some(Fallback::ReducedMotion);
            self.apply_visibility(id, VisibilityState::Visible, now_ms, reduced);
        }

        for change in self.detector.poll() {
            self.apply_visibility(change.element, change.state, now_ms, false);
        }

        for (id, entry) in self.entries.iter_mut() {
            let Entry::Counter { counter, .. } = entry else {
                continue;
            };
            if !counter.is_animating() {
                continue;
            }
            if counter.tick(now_ms) {
                self.outputs.push_change(Change::Display {
                    element: *id,
                    text: counter.display(),
                });
            }
            if counter.is_done() {
                self.outputs
                    .push_event(RevealEvent::CountUpFinished { element: *id });
            }
        }
        log::trace!(
            "update at {now_ms}ms: {} changes, {} events",
            self.outputs.changes.len(),
            self.outputs.events.len()
        );
        &self.outputs
    }

    fn apply_visibility(
        &mut self,
        id: ElementId,
        state: VisibilityState,
        now_ms: f64,
        skip_animation: bool,
    ) {
        let Some(entry) = self.entries.get_mut(&id) else {
            return;
        };
        self.outputs.push_event(if state.is_visible() {
            RevealEvent::Visible { element: id }
        } else {
            RevealEvent::Hidden { element: id }
        });
        match entry {
            Entry::Reveal(descriptor) => {
                self.outputs.push_change(Change::Token {
                    element: id,
                    class_name: descriptor.token(state),
                });
            }
            Entry::Group { descriptor, len } => {
                self.outputs.push_change(Change::Token {
                    element: id,
                    class_name: descriptor.token(state),
                });
                for index in 0..*len {
                    let item = descriptor.item(index, state);
                    self.outputs.push_change(Change::Item {
                        element: id,
                        index,
                        class_name: item.class_name(),
                        delay_ms: item.delay_ms,
                    });
                }
            }
            Entry::Counter { descriptor, counter } => {
                self.outputs.push_change(Change::Token {
                    element: id,
                    class_name: descriptor.token(state),
                });
                // Leaving the viewport never cancels a started count-up.
                if !state.is_visible() {
                    return;
                }
                if skip_animation {
                    if counter.finish() {
                        self.outputs.push_change(Change::Display {
                            element: id,
                            text: counter.display(),
                        });
                        self.outputs
                            .push_event(RevealEvent::CountUpFinished { element: id });
                    }
                } else if counter.trigger(now_ms) {
                    self.outputs
                        .push_event(RevealEvent::CountUpStarted { element: id });
                }
            }
        }
    }
}
