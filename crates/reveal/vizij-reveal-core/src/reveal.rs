//! Reveal descriptors and the presentation tokens derived from them.
//!
//! A token is what the renderer applies: a class string for single elements,
//! and a class string plus a transition delay for stagger-group children.

use serde::{Deserialize, Serialize};

use crate::error::RevealError;
use crate::visibility::{ObserveMode, VisibilityState};

/// Class added to any element once its trigger has fired.
pub const ACTIVE_CLASS: &str = "is-visible";
/// Base class of every stagger-group child.
pub const ITEM_CLASS: &str = "scroll-animate-item";

/// Entrance animation family.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RevealFamily {
    #[default]
    #[serde(alias = "up")]
    FadeUp,
    FadeIn,
    #[serde(alias = "left")]
    SlideLeft,
    #[serde(alias = "right")]
    SlideRight,
    Scale,
}

impl RevealFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevealFamily::FadeUp => "fade-up",
            RevealFamily::FadeIn => "fade-in",
            RevealFamily::SlideLeft => "slide-left",
            RevealFamily::SlideRight => "slide-right",
            RevealFamily::Scale => "scale",
        }
    }

    /// Base class carrying the pre-entrance state, e.g. `scroll-fade-up`.
    pub fn base_class(&self) -> String {
        format!("scroll-{}", self.as_str())
    }

    /// Left/right swapped; other families are symmetric.
    pub fn mirrored(self) -> Self {
        match self {
            RevealFamily::SlideLeft => RevealFamily::SlideRight,
            RevealFamily::SlideRight => RevealFamily::SlideLeft,
            other => other,
        }
    }

    /// Zig-zag layouts slide even rows in from the left and odd rows from
    /// the right. Visual only; stagger order stays declaration order.
    pub fn alternating(index: usize) -> Self {
        if index % 2 == 0 {
            RevealFamily::SlideLeft
        } else {
            RevealFamily::SlideRight
        }
    }
}

impl std::fmt::Display for RevealFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable reveal configuration for one element or group container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealDescriptor {
    pub family: RevealFamily,
    /// Fraction of the element that must be inside the viewport.
    pub threshold: f32,
    /// Delay between consecutive group children, in ms.
    pub stagger_ms: u32,
    /// Delay applied to child 0 (and added to every other child).
    pub base_offset_ms: u32,
    pub mode: ObserveMode,
    pub respect_reduced_motion: bool,
}

impl Default for RevealDescriptor {
    fn default() -> Self {
        Self {
            family: RevealFamily::FadeUp,
            threshold: 0.4,
            stagger_ms: 80,
            base_offset_ms: 0,
            mode: ObserveMode::Once,
            respect_reduced_motion: true,
        }
    }
}

impl RevealDescriptor {
    pub fn new(family: RevealFamily) -> Self {
        Self {
            family,
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_stagger(mut self, stagger_ms: u32) -> Self {
        self.stagger_ms = stagger_ms;
        self
    }

    pub fn with_base_offset(mut self, base_offset_ms: u32) -> Self {
        self.base_offset_ms = base_offset_ms;
        self
    }

    pub fn with_mode(mut self, mode: ObserveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_respect_reduced_motion(mut self, respect: bool) -> Self {
        self.respect_reduced_motion = respect;
        self
    }

    pub fn validate(&self) -> Result<(), RevealError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(RevealError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }

    /// Transition delay for child `index`: `base + index * stagger`.
    pub fn delay_for(&self, index: usize) -> u32 {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        self.base_offset_ms
            .saturating_add(index.saturating_mul(self.stagger_ms))
    }

    /// Class token for a single element in `state`.
    pub fn token(&self, state: VisibilityState) -> String {
        match state {
            VisibilityState::Pending => self.family.base_class(),
            VisibilityState::Visible => format!("{} {}", self.family.base_class(), ACTIVE_CLASS),
        }
    }

    /// Presentation for child `index` of a group whose container is in `state`.
    pub fn item(&self, index: usize, state: VisibilityState) -> StaggerItem {
        let active = state.is_visible();
        StaggerItem {
            index,
            active,
            delay_ms: if active { self.delay_for(index) } else { 0 },
        }
    }

    /// All child delays of a group of `len` children, in declaration order.
    pub fn delays(&self, len: usize) -> Vec<u32> {
        (0..len).map(|i| self.delay_for(i)).collect()
    }
}

/// Presentation of one stagger-group child.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaggerItem {
    pub index: usize,
    /// Whether the child has received its firing signal.
    pub active: bool,
    /// Transition delay in ms; 0 until the container is visible.
    pub delay_ms: u32,
}

impl StaggerItem {
    pub fn class_name(&self) -> String {
        if self.active {
            format!("{ITEM_CLASS} {ACTIVE_CLASS} stagger-index-{}", self.index)
        } else {
            format!("{ITEM_CLASS} stagger-index-{}", self.index)
        }
    }

    /// CSS `transition-delay` value.
    pub fn transition_delay_css(&self) -> String {
        format!("{}ms", self.delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_token_keeps_family_class() {
        let d = RevealDescriptor::new(RevealFamily::SlideLeft);
        assert_eq!(d.token(VisibilityState::Pending), "scroll-slide-left");
        assert_eq!(
            d.token(VisibilityState::Visible),
            "scroll-slide-left is-visible"
        );
    }

    #[test]
    fn four_children_at_100ms() {
        let d = RevealDescriptor::default().with_stagger(100);
        assert_eq!(d.delays(4), vec![0, 100, 200, 300]);
    }

    #[test]
    fn base_offset_shifts_every_child() {
        let d = RevealDescriptor::default()
            .with_stagger(50)
            .with_base_offset(200);
        assert_eq!(d.delays(3), vec![200, 250, 300]);
    }

    #[test]
    fn delays_saturate_instead_of_wrapping() {
        let d = RevealDescriptor::default().with_stagger(u32::MAX);
        assert_eq!(d.delay_for(3), u32::MAX);
    }

    #[test]
    fn items_inactive_until_container_visible() {
        let d = RevealDescriptor::default().with_stagger(100);
        let pending = d.item(3, VisibilityState::Pending);
        assert!(!pending.active);
        assert_eq!(pending.delay_ms, 0);
        assert_eq!(pending.class_name(), "scroll-animate-item stagger-index-3");

        let visible = d.item(3, VisibilityState::Visible);
        assert!(visible.active);
        assert_eq!(visible.delay_ms, 300);
        assert_eq!(visible.transition_delay_css(), "300ms");
        assert_eq!(
            visible.class_name(),
            "scroll-animate-item is-visible stagger-index-3"
        );
    }

    #[test]
    fn alternation_does_not_change_delays() {
        let d = RevealDescriptor::default().with_stagger(80);
        assert_eq!(RevealFamily::alternating(0), RevealFamily::SlideLeft);
        assert_eq!(RevealFamily::alternating(1), RevealFamily::SlideRight);
        assert_eq!(RevealFamily::alternating(1).mirrored(), RevealFamily::SlideLeft);
        assert_eq!(d.delay_for(1), 80);
    }

    #[test]
    fn family_aliases_deserialize() {
        let f: RevealFamily = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(f, RevealFamily::SlideLeft);
        let f: RevealFamily = serde_json::from_str("\"scale\"").unwrap();
        assert_eq!(f, RevealFamily::Scale);
    }

    #[test]
    fn threshold_is_validated() {
        assert!(RevealDescriptor::default().with_threshold(1.5).validate().is_err());
        assert!(RevealDescriptor::default().with_threshold(0.0).validate().is_ok());
    }
}
