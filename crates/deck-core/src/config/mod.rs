//! Deck configuration
//!
//! Everything that varies between presentations is data: the page list, the
//! indicator identifiers, the page effects, the input bindings and the settle
//! delay.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::effects::{EffectLibrary, EffectPolicy, DEFAULT_DURATION_MS};
use crate::input::{InputRouter, KeyBindings, SwipeDetector, DEFAULT_SWIPE_THRESHOLD};

/// Accepted settle delay range in milliseconds
pub const SETTLE_DELAY_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=400;

/// Default settle delay in milliseconds
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 300;

/// Errors found while loading or validating a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Deck must contain at least one page")]
    EmptyDeck,

    #[error("Expected {pages} indicators, found {indicators}")]
    IndicatorCountMismatch { pages: usize, indicators: usize },

    #[error("Effect '{effect}' bound to page {page}, but the deck has {total} pages")]
    EffectPageOutOfRange { effect: String, page: usize, total: usize },

    #[error("Page {0} has more than one effect")]
    DuplicateEffect(usize),

    #[error("Unknown effect '{0}'")]
    UnknownEffect(String),

    #[error("Settle delay {0}ms outside 100-400ms")]
    SettleDelayOutOfRange(u64),

    #[error("Swipe threshold must be positive, got {0}")]
    InvalidSwipeThreshold(f32),
}

/// Effect bound to a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    pub page: usize,
    pub effect: String,
    #[serde(default)]
    pub policy: EffectPolicy,
}

/// A stat counter shown by the `stat-counter` effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterConfig {
    pub target: u64,
    #[serde(default = "default_counter_duration")]
    pub duration_ms: u64,
}

fn default_counter_duration() -> u64 {
    DEFAULT_DURATION_MS
}

/// Keyboard and touch bindings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub forward_keys: Vec<String>,
    pub backward_keys: Vec<String>,
    pub swipe_threshold: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        let keys = KeyBindings::default();
        Self {
            forward_keys: keys.forward.iter().map(|k| k.to_string()).collect(),
            backward_keys: keys.backward.iter().map(|k| k.to_string()).collect(),
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
        }
    }
}

impl InputConfig {
    /// Build the router for these bindings
    pub fn router(&self) -> InputRouter {
        let keys = KeyBindings {
            forward: self.forward_keys.iter().map(|k| k.as_str().into()).collect(),
            backward: self.backward_keys.iter().map(|k| k.as_str().into()).collect(),
        };
        InputRouter::new(keys, SwipeDetector::new(self.swipe_threshold))
    }
}

/// Configuration for one deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Page identifiers, in order
    pub pages: Vec<String>,

    /// Progress dot identifiers, one per page
    #[serde(default)]
    pub indicators: Option<Vec<String>>,

    /// Identifier of the back control
    #[serde(default)]
    pub back_control: Option<String>,

    /// Page effects
    #[serde(default)]
    pub effects: Vec<EffectConfig>,

    /// Counters animated by `stat-counter`
    #[serde(default)]
    pub counters: Vec<CounterConfig>,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
}

fn default_settle_delay() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            pages: vec![
                "intro".to_string(),
                "stats".to_string(),
                "celebration".to_string(),
                "closing".to_string(),
            ],
            indicators: None,
            back_control: Some("back".to_string()),
            effects: vec![
                EffectConfig {
                    page: 1,
                    effect: "stat-counter".to_string(),
                    policy: EffectPolicy::FirstArrivalOnly,
                },
                EffectConfig {
                    page: 2,
                    effect: "confetti".to_string(),
                    policy: EffectPolicy::EveryArrival,
                },
            ],
            counters: vec![
                CounterConfig {
                    target: 12_500,
                    duration_ms: DEFAULT_DURATION_MS,
                },
                CounterConfig {
                    target: 98,
                    duration_ms: DEFAULT_DURATION_MS,
                },
            ],
            input: InputConfig::default(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

impl DeckConfig {
    /// Parse a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Dot identifiers, generated when none are configured
    pub fn indicator_ids(&self) -> Vec<String> {
        match &self.indicators {
            Some(ids) => ids.clone(),
            None => (0..self.pages.len()).map(|i| format!("dot-{}", i)).collect(),
        }
    }

    /// Check the configuration against the effects available
    pub fn validate(&self, library: &EffectLibrary) -> Result<(), ConfigError> {
        let total = self.pages.len();
        if total == 0 {
            return Err(ConfigError::EmptyDeck);
        }

        if let Some(ids) = &self.indicators {
            if ids.len() != total {
                return Err(ConfigError::IndicatorCountMismatch {
                    pages: total,
                    indicators: ids.len(),
                });
            }
        }

        let mut seen = HashSet::new();
        for binding in &self.effects {
            if binding.page >= total {
                return Err(ConfigError::EffectPageOutOfRange {
                    effect: binding.effect.clone(),
                    page: binding.page,
                    total,
                });
            }
            if !seen.insert(binding.page) {
                return Err(ConfigError::DuplicateEffect(binding.page));
            }
            if !library.contains(&binding.effect) {
                return Err(ConfigError::UnknownEffect(binding.effect.clone()));
            }
        }

        if !SETTLE_DELAY_RANGE_MS.contains(&self.settle_delay_ms) {
            return Err(ConfigError::SettleDelayOutOfRange(self.settle_delay_ms));
        }

        if !(self.input.swipe_threshold > 0.0) {
            return Err(ConfigError::InvalidSwipeThreshold(self.input.swipe_threshold));
        }

        Ok(())
    }
}
