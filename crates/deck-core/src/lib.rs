//! Core functionality for the storytelling deck
//!
//! This crate provides the page navigator state machine, the arrival effect
//! dispatch, indicator synchronization and the input adapters that drive a
//! single linear deck of pages.

pub mod config;
pub mod effects;
pub mod input;
pub mod navigation;
pub mod runtime;
pub mod state;
pub mod sync;

use thiserror::Error;

// Re-export commonly used types
pub use config::{ConfigError, DeckConfig};
pub use effects::{EffectFn, EffectLibrary, EffectPolicy, EffectSink};
pub use input::{InputEvent, InputRouter, Key, KeyBindings, SwipeDetector, TouchTracker};
pub use navigation::{
    Arrival, Direction, IgnoreReason, IndicatorSync, NavigationContext, NavigationOutcome, PageDisplay,
    PageNavigator, Transition,
};
pub use runtime::NavigatorDriver;
pub use state::Presentation;
pub use sync::IndicatorState;

/// Errors raised while assembling a deck
#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page {index} out of range (deck has {total} pages)")]
    PageOutOfRange { index: usize, total: usize },

    #[error("Unknown effect: {0}")]
    UnknownEffect(String),
}
