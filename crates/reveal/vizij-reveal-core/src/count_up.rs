//! Count-up: animate a displayed integer from 0 to its target once visible.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::RevealError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountUpConfig {
    pub duration_ms: f64,
    /// Wait between the visibility trigger and the first animated frame.
    pub start_delay_ms: f64,
    pub easing: Easing,
}

impl Default for CountUpConfig {
    fn default() -> Self {
        Self {
            duration_ms: 2000.0,
            start_delay_ms: 0.0,
            easing: Easing::EaseOutCubic,
        }
    }
}

impl CountUpConfig {
    pub fn validate(&self) -> Result<(), RevealError> {
        if !(self.duration_ms.is_finite() && self.duration_ms > 0.0) {
            return Err(RevealError::InvalidDuration(self.duration_ms));
        }
        if !(self.start_delay_ms.is_finite() && self.start_delay_ms >= 0.0) {
            return Err(RevealError::InvalidDuration(self.start_delay_ms));
        }
        if !(self.easing.is_monotonic() && self.easing.has_valid_control_points()) {
            return Err(RevealError::InvalidEasing(self.easing));
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "kebab-case")]
pub enum CountUpPhase {
    Idle,
    Delayed { until_ms: f64 },
    Running { start_ms: f64 },
    Done,
}

/// Parse a count-up target. Only plain integers animate; anything else
/// (`"N/A"`, `"1,200"`, `"4.5"`) is shown verbatim.
pub fn parse_target(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

/// One counter. Driven by [`CountUp::trigger`] and [`CountUp::tick`].
#[derive(Clone, Debug)]
pub struct CountUp {
    text: String,
    unit: String,
    target: Option<i64>,
    cfg: CountUpConfig,
    phase: CountUpPhase,
    current: i64,
}

impl CountUp {
    pub fn new(value: &str, unit: &str, cfg: CountUpConfig) -> Self {
        Self {
            text: value.to_string(),
            unit: unit.to_string(),
            target: parse_target(value),
            cfg,
            phase: CountUpPhase::Idle,
            current: 0,
        }
    }

    pub fn target(&self) -> Option<i64> {
        self.target
    }

    pub fn is_numeric(&self) -> bool {
        self.target.is_some()
    }

    pub fn phase(&self) -> CountUpPhase {
        self.phase
    }

    /// Delayed or running; the host should keep requesting frames.
    pub fn is_animating(&self) -> bool {
        matches!(
            self.phase,
            CountUpPhase::Delayed { .. } | CountUpPhase::Running { .. }
        )
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, CountUpPhase::Done)
    }

    /// Start the animation. One-shot: returns `false` if already started or
    /// the target is not numeric.
    pub fn trigger(&mut self, now_ms: f64) -> bool {
        if self.target.is_none() || !matches!(self.phase, CountUpPhase::Idle) {
            return false;
        }
        self.phase = if self.cfg.start_delay_ms > 0.0 {
            CountUpPhase::Delayed {
                until_ms: now_ms + self.cfg.start_delay_ms,
            }
        } else {
            CountUpPhase::Running { start_ms: now_ms }
        };
        true
    }

    /// Jump to the final value without animating (reduced motion).
    pub fn finish(&mut self) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        if self.is_done() {
            return false;
        }
        self.current = target;
        self.phase = CountUpPhase::Done;
        true
    }

    /// Advance to `now_ms`. Returns `true` if the displayed text changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        if let CountUpPhase::Delayed { until_ms } = self.phase {
            if now_ms < until_ms {
                return false;
            }
            self.phase = CountUpPhase::Running { start_ms: until_ms };
        }
        let CountUpPhase::Running { start_ms } = self.phase else {
            return false;
        };

        let elapsed = (now_ms - start_ms).max(0.0);
        if elapsed >= self.cfg.duration_ms {
            let changed = self.current != target || self.text.trim() != target.to_string();
            self.current = target;
            self.phase = CountUpPhase::Done;
            log::trace!("count-up finished at {target}");
            return changed;
        }

        let next = self.value_at(elapsed);
        let changed = next != self.current;
        self.current = next;
        changed
    }

    /// Displayed integer `elapsed_ms` after start. Never moves away from the
    /// target relative to the current value.
    pub fn value_at(&self, elapsed_ms: f64) -> i64 {
        let Some(target) = self.target else {
            return 0;
        };
        if elapsed_ms >= self.cfg.duration_ms {
            return target;
        }
        let eased = self.cfg.easing.apply(elapsed_ms / self.cfg.duration_ms);
        let raw = (target as f64 * eased).floor() as i64;
        if target >= 0 {
            raw.clamp(self.current.min(target), target)
        } else {
            raw.clamp(target, self.current.max(target))
        }
    }

    pub fn current(&self) -> i64 {
        self.current
    }

    /// Text the renderer shows: value followed by unit. Once finished the
    /// authored text is shown again, so `"+15"` ends as `"+15"`, not `"15"`.
    pub fn display(&self) -> String {
        match self.target {
            Some(_) if !self.is_done() => format!("{}{}", self.current, self.unit),
            Some(_) => format!("{}{}", self.text.trim(), self.unit),
            None => format!("{}{}", self.text, self.unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percent(value: &str) -> CountUp {
        CountUp::new(value, "%", CountUpConfig::default())
    }

    #[test]
    fn endpoints_are_exact() {
        let mut c = percent("120");
        assert_eq!(c.display(), "0%");
        assert!(c.trigger(0.0));
        c.tick(0.0);
        assert_eq!(c.display(), "0%");
        c.tick(2000.0);
        assert_eq!(c.display(), "120%");
        assert!(c.is_done());
    }

    #[test]
    fn monotonic_at_every_frame() {
        let mut c = CountUp::new("9876", "", CountUpConfig::default());
        c.trigger(100.0);
        let mut prev = 0;
        let mut t = 100.0;
        while !c.is_done() {
            t += 16.7;
            c.tick(t);
            assert!(c.current() >= prev, "decreased at t={t}");
            assert!(c.current() <= 9876);
            prev = c.current();
        }
        assert_eq!(c.current(), 9876);
    }

    #[test]
    fn verbatim_text_never_animates() {
        let mut c = CountUp::new("N/A", "", CountUpConfig::default());
        assert_eq!(c.display(), "N/A");
        assert!(!c.trigger(0.0));
        assert!(!c.tick(1000.0));
        assert_eq!(c.display(), "N/A");
        assert!(!c.is_animating());
    }

    #[test]
    fn strict_integer_parsing() {
        assert_eq!(parse_target(" 42 "), Some(42));
        assert_eq!(parse_target("-7"), Some(-7));
        assert_eq!(parse_target("1,200"), None);
        assert_eq!(parse_target("4.5"), None);
        assert_eq!(parse_target(""), None);
    }

    #[test]
    fn start_delay_holds_zero() {
        let cfg = CountUpConfig {
            start_delay_ms: 300.0,
            ..CountUpConfig::default()
        };
        let mut c = CountUp::new("50", "", cfg);
        c.trigger(0.0);
        assert!(!c.tick(299.0));
        assert_eq!(c.current(), 0);
        assert!(c.is_animating());
        c.tick(300.0 + 2000.0);
        assert_eq!(c.current(), 50);
    }

    #[test]
    fn trigger_is_one_shot() {
        let mut c = percent("10");
        assert!(c.trigger(0.0));
        c.tick(1000.0);
        let mid = c.current();
        assert!(!c.trigger(1000.0));
        c.tick(1000.0);
        assert_eq!(c.current(), mid);
    }

    #[test]
    fn negative_targets_move_down() {
        let mut c = CountUp::new("-40", "", CountUpConfig::default());
        c.trigger(0.0);
        let mut prev = 0;
        for i in 1..=20 {
            c.tick(i as f64 * 100.0);
            assert!(c.current() <= prev);
            prev = c.current();
        }
        assert_eq!(c.current(), -40);
    }

    #[test]
    fn finished_display_is_authored_text() {
        let mut c = percent("+15");
        c.trigger(0.0);
        c.tick(1000.0);
        assert!(!c.display().starts_with('+'));
        assert!(c.tick(2000.0));
        assert_eq!(c.display(), "+15%");
    }

    #[test]
    fn overshooting_or_malformed_curves_rejected() {
        let spring = CountUpConfig {
            easing: Easing::SPRING,
            ..CountUpConfig::default()
        };
        assert!(matches!(
            spring.validate(),
            Err(RevealError::InvalidEasing(e)) if e == Easing::SPRING
        ));
        let bad_x = CountUpConfig {
            easing: Easing::CubicBezier([-2.0, 0.5, 3.0, 1.0]),
            ..CountUpConfig::default()
        };
        assert!(matches!(bad_x.validate(), Err(RevealError::InvalidEasing(_))));
        let soft = CountUpConfig {
            easing: Easing::SOFT,
            ..CountUpConfig::default()
        };
        assert!(soft.validate().is_ok());
    }

    #[test]
    fn zero_duration_rejected() {
        let cfg = CountUpConfig {
            duration_ms: 0.0,
            ..CountUpConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
