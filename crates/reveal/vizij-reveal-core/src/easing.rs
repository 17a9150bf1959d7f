//! Easing curves used by count-up and hero timelines.
//!
//! Every curve maps `[0, 1]` onto `[0, 1]` and returns exactly `1.0` at the
//! end so callers can snap to their final value without residue.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    #[default]
    EaseOutCubic,
    EaseOutExpo,
    EaseOutQuint,
    /// CSS-style cubic-bezier with control points (x1, y1, x2, y2).
    CubicBezier([f32; 4]),
}

impl Easing {
    /// Main hero ease-out.
    pub const PRIMARY: Easing = Easing::CubicBezier([0.22, 1.0, 0.36, 1.0]);
    /// Softer deceleration.
    pub const SOFT: Easing = Easing::CubicBezier([0.25, 0.46, 0.45, 0.94]);
    /// Slight overshoot. Not monotonic; never used for count-up.
    pub const SPRING: Easing = Easing::CubicBezier([0.34, 1.56, 0.64, 1.0]);

    /// Eased progress for `t`, clamped to `[0, 1]`.
    pub fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if t >= 1.0 {
            return 1.0;
        }
        match *self {
            Easing::Linear => t,
            Easing::EaseOutCubic => ease_out_cubic(t),
            Easing::EaseOutExpo => ease_out_expo(t),
            Easing::EaseOutQuint => 1.0 - (1.0 - t).powi(5),
            Easing::CubicBezier([x1, y1, x2, y2]) => {
                bezier_ease_t(t, x1 as f64, y1 as f64, x2 as f64, y2 as f64)
            }
        }
    }

    /// Monotonic curves never move backwards; count-up relies on this.
    pub fn is_monotonic(&self) -> bool {
        match *self {
            Easing::CubicBezier([_, y1, _, y2]) => (0.0..=1.0).contains(&y1) && (0.0..=1.0).contains(&y2),
            _ => true,
        }
    }

    /// Bezier x control points inside `[0, 1]`, which keeps the curve a
    /// function of time and lets `bezier_ease_t` bisect.
    pub fn has_valid_control_points(&self) -> bool {
        match *self {
            Easing::CubicBezier([x1, _, x2, _]) => {
                (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2)
            }
            _ => true,
        }
    }

    /// CSS `transition-timing-function` value.
    pub fn css(&self) -> String {
        match *self {
            Easing::Linear => "linear".to_string(),
            Easing::EaseOutCubic => "cubic-bezier(0.33, 1, 0.68, 1)".to_string(),
            Easing::EaseOutExpo => "cubic-bezier(0.16, 1, 0.3, 1)".to_string(),
            Easing::EaseOutQuint => "cubic-bezier(0.22, 1, 0.36, 1)".to_string(),
            Easing::CubicBezier([x1, y1, x2, y2]) => {
                format!("cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        }
    }
}

#[inline]
pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[inline]
pub fn ease_out_expo(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * t)
    }
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Invert the x bezier by bisection, then evaluate y.
fn bezier_ease_t(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if x1 == y1 && x2 == y2 {
        return t;
    }
    let mut lo = 0.0f64;
    let mut hi = 1.0f64;
    let mut mid = t;
    for _ in 0..32 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-9 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}
