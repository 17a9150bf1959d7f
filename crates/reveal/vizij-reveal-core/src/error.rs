//! Error types for the reveal core.
//!
//! None of these reach the page visitor: every caller falls back to the
//! least-animated presentation. They exist so hosts can log and so config
//! mistakes fail loudly at load time.

use thiserror::Error;

use crate::easing::Easing;
use crate::ids::ElementId;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RevealError {
    /// Visibility threshold outside `[0, 1]`.
    #[error("threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f32),

    /// Zero or non-finite animation duration.
    #[error("duration must be a positive number of milliseconds, got {0}")]
    InvalidDuration(f64),

    /// Curve that overshoots, moves backwards or is not a function of time.
    #[error("easing must be monotonic with x control points in [0, 1], got {0:?}")]
    InvalidEasing(Easing),

    #[error("unknown element {0}")]
    UnknownElement(ElementId),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Failures of the session-scoped key-value store backing the hero gate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("session store is not available")]
    Unavailable,
    #[error("session store error: {0}")]
    Backend(String),
}

/// Failures of a visibility source when registering an element.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("viewport intersection is not supported by this host")]
    Unsupported,
    #[error("visibility source error: {0}")]
    Backend(String),
}
