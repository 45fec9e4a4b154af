use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::config::DeckConfig;
use crate::effects::{BurstQueue, CounterAnimation, CounterBoard, EffectLibrary, EffectResources};
use crate::input::{InputEvent, InputRouter};
use crate::navigation::{NavigationOutcome, PageNavigator};
use crate::sync::IndicatorState;
use crate::DeckError;

/// A fully assembled deck
///
/// Built once from a [`DeckConfig`] and passed by reference to whatever
/// feeds it input or renders it.
pub struct Presentation {
    /// Page identifiers, in order
    pub pages: Vec<String>,

    /// The page navigator
    pub navigator: PageNavigator,

    /// Progress dots and back control
    pub indicators: Arc<IndicatorState>,

    /// Input bindings
    pub input: InputRouter,

    /// Shared state written by the built-in effects
    pub resources: EffectResources,
}

impl Presentation {
    /// Assemble a deck using the built-in effects
    pub fn from_config(config: &DeckConfig) -> Result<Self, DeckError> {
        Self::with_library(config, &EffectLibrary::with_builtins())
    }

    /// Assemble a deck resolving effect names against `library`
    pub fn with_library(config: &DeckConfig, library: &EffectLibrary) -> Result<Self, DeckError> {
        config.validate(library)?;

        let navigator = PageNavigator::new(config.pages.len(), config.settle_delay())?;

        let indicators = Arc::new(IndicatorState::new(config.indicator_ids(), config.back_control.clone()));
        navigator.add_subscriber(indicators.clone());

        let counters = config
            .counters
            .iter()
            .map(|c| CounterAnimation::new(c.target, c.duration_ms))
            .collect();
        let resources = EffectResources {
            bursts: BurstQueue::new(),
            counters: CounterBoard::new(counters),
        };

        for binding in &config.effects {
            let callback = library.resolve(&binding.effect, &resources, binding.page)?;
            navigator.bind_effect(binding.page, binding.effect.clone(), binding.policy, callback)?;
        }

        info!(
            pages = config.pages.len(),
            effects = config.effects.len(),
            settle_delay_ms = config.settle_delay_ms,
            "Presentation assembled"
        );

        Ok(Self {
            pages: config.pages.clone(),
            navigator,
            indicators,
            input: config.input.router(),
            resources,
        })
    }

    /// Identifier of the committed current page
    pub fn current_page_id(&self) -> &str {
        &self.pages[self.navigator.current_page()]
    }

    /// Route one input event to the navigator
    pub fn handle_input(&self, event: &InputEvent, now: Instant) -> Option<NavigationOutcome> {
        self.input.dispatch(&self.navigator, event, now)
    }
}
