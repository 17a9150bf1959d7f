//! Hero-intro gate and timeline.
//!
//! The gate decides once per page load whether the landing hero plays its
//! entrance animation. The decision is backed by a flag in a session-scoped
//! store so a visitor sees the intro once per browsing session.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::env::{MotionPreference, SessionStore};

pub const DEFAULT_STORAGE_KEY: &str = "hero-animation-played";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HeroPolicy {
    /// Play on the first view of the session only.
    #[default]
    OncePerSession,
    /// Play on every load.
    Always,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    pub enabled: bool,
    pub policy: HeroPolicy,
    pub storage_key: String,
    pub respect_reduced_motion: bool,
    pub timeline: HeroTimeline,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            policy: HeroPolicy::OncePerSession,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            respect_reduced_motion: true,
            timeline: HeroTimeline::default(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HeroDecision {
    #[default]
    Undetermined,
    Skip,
    Play,
}

/// What the renderer should draw for the hero right now.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeroPresentation {
    /// Decision pending: fixed background, no content. Avoids a flash of the
    /// final layout before the gate has run.
    Placeholder,
    /// Final layout, no entrance animation.
    Static,
    /// Entrance animation per [`HeroTimeline`].
    Animated,
}

#[derive(Debug)]
pub struct HeroGate<K: SessionStore> {
    cfg: HeroConfig,
    store: K,
    decision: HeroDecision,
}

impl<K: SessionStore> HeroGate<K> {
    pub fn new(cfg: HeroConfig, store: K) -> Self {
        Self {
            cfg,
            store,
            decision: HeroDecision::Undetermined,
        }
    }

    pub fn config(&self) -> &HeroConfig {
        &self.cfg
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn into_store(self) -> K {
        self.store
    }

    pub fn decision(&self) -> HeroDecision {
        self.decision
    }

    pub fn presentation(&self) -> HeroPresentation {
        match self.decision {
            HeroDecision::Undetermined => HeroPresentation::Placeholder,
            HeroDecision::Skip => HeroPresentation::Static,
            HeroDecision::Play => HeroPresentation::Animated,
        }
    }

    /// Resolve the decision for this page load. Later calls return the
    /// first result.
    pub fn resolve(&mut self, motion: &impl MotionPreference) -> HeroDecision {
        if self.decision != HeroDecision::Undetermined {
            return self.decision;
        }
        self.decision = self.decide(motion);
        log::debug!("hero intro resolved: {:?}", self.decision);
        self.decision
    }

    fn decide(&mut self, motion: &impl MotionPreference) -> HeroDecision {
        if !self.cfg.enabled {
            return HeroDecision::Skip;
        }
        if self.cfg.respect_reduced_motion && motion.prefers_reduced_motion() {
            return HeroDecision::Skip;
        }
        if self.cfg.policy == HeroPolicy::OncePerSession {
            if self.has_played() {
                return HeroDecision::Skip;
            }
            // Flag goes in before the animation starts so a fast reload
            // cannot play it twice.
            self.mark_played();
        }
        HeroDecision::Play
    }

    /// Whether the session flag is set. Store failures read as "not played".
    pub fn has_played(&self) -> bool {
        match self.store.get(&self.cfg.storage_key) {
            Ok(v) => v.is_some(),
            Err(err) => {
                log::warn!("hero intro: {err}; treating as first visit");
                false
            }
        }
    }

    fn mark_played(&mut self) {
        if let Err(err) = self.store.set(&self.cfg.storage_key, "true") {
            log::warn!("hero intro: could not record play: {err}");
        }
    }

    fn clear_flag(&mut self) {
        if let Err(err) = self.store.remove(&self.cfg.storage_key) {
            log::warn!("hero intro: could not clear flag: {err}");
        }
    }

    /// Clear the flag and play again now, without a reload.
    pub fn replay(&mut self) -> HeroDecision {
        self.clear_flag();
        self.decision = HeroDecision::Play;
        log::debug!("hero intro replay requested");
        self.decision
    }

    /// Clear the flag; affects future loads only.
    pub fn reset(&mut self) {
        self.clear_flag();
    }

    /// Set the flag so the next load skips the intro.
    pub fn skip_next(&mut self) {
        self.mark_played();
    }
}

/// Hero parts, in the order they enter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeroPart {
    Background,
    Shape,
    MainCopy,
    SubCopy,
    Cta,
    ScrollIndicator,
}

impl HeroPart {
    pub const ALL: [HeroPart; 6] = [
        HeroPart::Background,
        HeroPart::Shape,
        HeroPart::MainCopy,
        HeroPart::SubCopy,
        HeroPart::Cta,
        HeroPart::ScrollIndicator,
    ];

    /// Suffix used in the `--hero-*` custom properties.
    pub fn css_key(&self) -> &'static str {
        match self {
            HeroPart::Background => "bg",
            HeroPart::Shape => "shape",
            HeroPart::MainCopy => "main",
            HeroPart::SubCopy => "sub",
            HeroPart::Cta => "cta",
            HeroPart::ScrollIndicator => "scroll",
        }
    }
}

/// Timing of one hero part.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeroCue {
    pub duration_ms: u32,
    pub delay_ms: u32,
    /// Vertical slide distance, px.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_px: Option<f32>,
    /// Initial scale for scale-in parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_scale: Option<f32>,
}

impl HeroCue {
    const fn new(duration_ms: u32, delay_ms: u32) -> Self {
        Self {
            duration_ms,
            delay_ms,
            offset_px: None,
            initial_scale: None,
        }
    }

    pub fn end_ms(&self) -> u32 {
        self.delay_ms.saturating_add(self.duration_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroTimeline {
    pub background: HeroCue,
    pub shape: HeroCue,
    pub main_copy: HeroCue,
    pub sub_copy: HeroCue,
    pub cta: HeroCue,
    pub scroll_indicator: HeroCue,
    pub easing: Easing,
}

impl Default for HeroTimeline {
    fn default() -> Self {
        Self {
            background: HeroCue::new(1200, 0),
            shape: HeroCue {
                initial_scale: Some(0.85),
                ..HeroCue::new(1000, 100)
            },
            main_copy: HeroCue {
                offset_px: Some(50.0),
                ..HeroCue::new(900, 200)
            },
            sub_copy: HeroCue {
                offset_px: Some(35.0),
                ..HeroCue::new(800, 350)
            },
            cta: HeroCue {
                offset_px: Some(25.0),
                ..HeroCue::new(700, 550)
            },
            scroll_indicator: HeroCue::new(600, 1400),
            easing: Easing::PRIMARY,
        }
    }
}

impl HeroTimeline {
    pub fn cue(&self, part: HeroPart) -> &HeroCue {
        match part {
            HeroPart::Background => &self.background,
            HeroPart::Shape => &self.shape,
            HeroPart::MainCopy => &self.main_copy,
            HeroPart::SubCopy => &self.sub_copy,
            HeroPart::Cta => &self.cta,
            HeroPart::ScrollIndicator => &self.scroll_indicator,
        }
    }

    /// Time until the last part has finished entering.
    pub fn total_duration_ms(&self) -> u32 {
        HeroPart::ALL
            .iter()
            .map(|p| self.cue(*p).end_ms())
            .max()
            .unwrap_or(0)
    }

    /// `--hero-*` custom properties, durations then delays then the rest.
    pub fn css_variables(&self) -> Vec<(String, String)> {
        let mut vars = Vec::with_capacity(HeroPart::ALL.len() * 2 + 5);
        for part in HeroPart::ALL {
            vars.push((
                format!("--hero-duration-{}", part.css_key()),
                format!("{}ms", self.cue(part).duration_ms),
            ));
        }
        for part in HeroPart::ALL {
            vars.push((
                format!("--hero-delay-{}", part.css_key()),
                format!("{}ms", self.cue(part).delay_ms),
            ));
        }
        vars.push(("--hero-easing".to_string(), self.easing.css()));
        for part in HeroPart::ALL {
            if let Some(px) = self.cue(part).offset_px {
                vars.push((
                    format!("--hero-distance-{}", part.css_key()),
                    format!("{px}px"),
                ));
            }
        }
        for part in HeroPart::ALL {
            if let Some(scale) = self.cue(part).initial_scale {
                vars.push((format!("--hero-scale-{}", part.css_key()), format!("{scale}")));
            }
        }
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{MemoryStore, UnavailableStore};

    #[test]
    fn first_visit_plays_then_reload_skips() {
        let mut gate = HeroGate::new(HeroConfig::default(), MemoryStore::new());
        assert_eq!(gate.presentation(), HeroPresentation::Placeholder);
        assert_eq!(gate.resolve(&false), HeroDecision::Play);
        assert!(gate.store().contains(DEFAULT_STORAGE_KEY));
        assert_eq!(gate.presentation(), HeroPresentation::Animated);

        // reload: same session store, new gate
        let mut reload = HeroGate::new(HeroConfig::default(), gate.into_store());
        assert_eq!(reload.resolve(&false), HeroDecision::Skip);
        assert_eq!(reload.presentation(), HeroPresentation::Static);
    }

    #[test]
    fn decision_is_terminal_per_load() {
        let mut gate = HeroGate::new(HeroConfig::default(), MemoryStore::new());
        assert_eq!(gate.resolve(&false), HeroDecision::Play);
        assert_eq!(gate.resolve(&false), HeroDecision::Play);
    }

    #[test]
    fn disabled_and_reduced_motion_skip_without_touching_store() {
        let cfg = HeroConfig {
            enabled: false,
            ..HeroConfig::default()
        };
        let mut gate = HeroGate::new(cfg, MemoryStore::new());
        assert_eq!(gate.resolve(&false), HeroDecision::Skip);
        assert!(gate.store().is_empty());

        let mut gate = HeroGate::new(HeroConfig::default(), MemoryStore::new());
        assert_eq!(gate.resolve(&true), HeroDecision::Skip);
        assert!(gate.store().is_empty());
    }

    #[test]
    fn always_policy_ignores_flag() {
        let cfg = HeroConfig {
            policy: HeroPolicy::Always,
            ..HeroConfig::default()
        };
        let mut store = MemoryStore::new();
        store.set(DEFAULT_STORAGE_KEY, "true").unwrap();
        let mut gate = HeroGate::new(cfg, store);
        assert_eq!(gate.resolve(&false), HeroDecision::Play);
    }

    #[test]
    fn replay_forces_play_and_reset_only_clears() {
        let mut gate = HeroGate::new(HeroConfig::default(), MemoryStore::new());
        gate.skip_next();
        assert!(gate.has_played());
        assert_eq!(gate.resolve(&false), HeroDecision::Skip);

        gate.reset();
        assert!(!gate.has_played());
        assert_eq!(gate.decision(), HeroDecision::Skip, "reset leaves this load alone");

        gate.skip_next();
        assert_eq!(gate.replay(), HeroDecision::Play);
        assert!(!gate.has_played());
    }

    #[test]
    fn broken_store_still_plays() {
        let mut gate = HeroGate::new(HeroConfig::default(), UnavailableStore);
        assert_eq!(gate.resolve(&false), HeroDecision::Play);
    }

    #[test]
    fn timeline_css_variables() {
        let t = HeroTimeline::default();
        let vars = t.css_variables();
        let get = |k: &str| {
            vars.iter()
                .find(|(name, _)| name == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("--hero-duration-bg"), Some("1200ms"));
        assert_eq!(get("--hero-delay-scroll"), Some("1400ms"));
        assert_eq!(get("--hero-easing"), Some("cubic-bezier(0.22, 1, 0.36, 1)"));
        assert_eq!(get("--hero-distance-main"), Some("50px"));
        assert_eq!(get("--hero-scale-shape"), Some("0.85"));
        assert_eq!(vars[0].0, "--hero-duration-bg");
        assert_eq!(t.total_duration_ms(), 2000);
    }
}
