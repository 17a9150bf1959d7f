//! Core configuration for vizij-reveal-core.

use serde::{Deserialize, Serialize};

use crate::count_up::CountUpConfig;
use crate::error::RevealError;
use crate::hero::HeroConfig;
use crate::reveal::RevealDescriptor;

/// Page-wide animation settings. Every field has a default, so partial JSON
/// (`{"scroll": {"threshold": 0.2}}`) is valid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default descriptor for scroll reveals and stagger groups.
    pub scroll: RevealDescriptor,
    pub count_up: CountUpConfig,
    pub hero: HeroConfig,
}

impl Config {
    /// Parse and validate a JSON config.
    pub fn from_json(text: &str) -> Result<Self, RevealError> {
        let cfg: Config = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), RevealError> {
        self.scroll.validate()?;
        self.count_up.validate()?;
        Ok(())
    }
}
