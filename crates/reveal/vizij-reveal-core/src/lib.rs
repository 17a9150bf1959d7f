//! Vizij Reveal Core (engine-agnostic)
//!
//! Scroll-triggered presentation timing for web pages: one-shot or repeating
//! visibility detection, reveal class tokens, staggered sibling delays,
//! count-up numbers and the once-per-session hero intro gate.
//!
//! The host supplies intersection reports ([`VisibilitySource`]), a session
//! store ([`SessionStore`]), the reduced-motion preference and frame
//! timestamps. The core never touches layout; it returns tokens in
//! [`Outputs`] for adapters (see `vizij-reveal-wasm`) to apply.

pub mod config;
pub mod count_up;
pub mod easing;
pub mod engine;
pub mod env;
pub mod error;
pub mod hero;
pub mod ids;
pub mod outputs;
pub mod reveal;
pub mod visibility;

// Re-exports for consumers (adapters)
pub use config::Config;
pub use count_up::{parse_target, CountUp, CountUpConfig, CountUpPhase};
pub use easing::Easing;
pub use engine::RevealEngine;
pub use env::{
    FrameClock, ManualClock, MemoryStore, MotionPreference, SessionStore, UnavailableStore,
};
pub use error::{RevealError, SourceError, StoreError};
pub use hero::{
    HeroConfig, HeroCue, HeroDecision, HeroGate, HeroPart, HeroPolicy, HeroPresentation,
    HeroTimeline, DEFAULT_STORAGE_KEY,
};
pub use ids::{ElementId, IdAllocator};
pub use outputs::{Change, Outputs, RevealEvent};
pub use reveal::{RevealDescriptor, RevealFamily, StaggerItem, ACTIVE_CLASS, ITEM_CLASS};
pub use visibility::{
    Fallback, IntersectionEntry, ManualSource, ObserveMode, Registration, VisibilityChange,
    VisibilityDetector, VisibilitySource, VisibilityState,
};
