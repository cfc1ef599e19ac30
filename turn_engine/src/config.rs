//! Engine tuning knobs, loadable from TOML.
//!
//! Defaults carry the canonical policy constants; a config document only
//! needs the fields it overrides. Changing a cap is a data edit, not a code
//! change.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retrieval::RetrievalLimits;

/// Errors from loading a config document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Per-context caps on requested in-world minutes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeCaps {
    /// Cap when the character slept this turn.
    pub sleep: i64,
    /// Cap during combat scenes.
    pub combat: i64,
    /// Cap everywhere else.
    pub default: i64,
}

impl Default for TimeCaps {
    fn default() -> Self {
        Self { sleep: 540, combat: 30, default: 120 }
    }
}

/// All engine tuning in one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub time_caps: TimeCaps,
    pub retrieval_limits: RetrievalLimits,
    /// Similarity at or above which a proposed memory merges into an
    /// existing one.
    pub memory_merge_threshold: f32,
    /// Probability that an explicit biological event results in conception.
    pub conception_chance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_caps: TimeCaps::default(),
            retrieval_limits: RetrievalLimits::default(),
            memory_merge_threshold: 0.65,
            conception_chance: 0.30,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document, validating ranges.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.memory_merge_threshold) {
            return Err(ConfigError::Invalid(format!(
                "memory_merge_threshold {} outside [0, 1]",
                self.memory_merge_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.conception_chance) {
            return Err(ConfigError::Invalid(format!(
                "conception_chance {} outside [0, 1]",
                self.conception_chance
            )));
        }
        if self.time_caps.sleep < 0 || self.time_caps.combat < 0 || self.time_caps.default < 0 {
            return Err(ConfigError::Invalid("time caps must be non-negative".into()));
        }
        Ok(())
    }
}
