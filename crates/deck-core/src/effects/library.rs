//! Named effect resolution
//!
//! Effect configuration refers to effects by name. The library turns a name
//! into a callback bound to the shared effect resources at startup.

use std::sync::Arc;

use ahash::AHashMap;
use tracing::info;

use super::{BurstKind, BurstQueue, CounterBoard, EffectFn};
use crate::DeckError;

/// Shared state the built-in effects write into
#[derive(Debug, Clone, Default)]
pub struct EffectResources {
    pub bursts: BurstQueue,
    pub counters: CounterBoard,
}

/// Builds a callback for the given page
pub type EffectFactory = Box<dyn Fn(&EffectResources, usize) -> EffectFn + Send + Sync>;

/// Registry of named effects
pub struct EffectLibrary {
    factories: AHashMap<String, EffectFactory>,
}

impl EffectLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self {
            factories: AHashMap::new(),
        }
    }

    /// Library with the built-in effects registered
    pub fn with_builtins() -> Self {
        let mut library = Self::new();

        library.register("confetti", |resources: &EffectResources, page: usize| {
            burst_effect(resources.bursts.clone(), page, BurstKind::Confetti)
        });
        library.register("particles", |resources: &EffectResources, page: usize| {
            burst_effect(resources.bursts.clone(), page, BurstKind::Particles)
        });
        library.register("stat-counter", |resources: &EffectResources, _page: usize| {
            let counters = resources.counters.clone();
            let effect: EffectFn = Arc::new(move || -> anyhow::Result<()> {
                counters.restart();
                Ok(())
            });
            effect
        });
        library.register("log", |_resources: &EffectResources, page: usize| {
            let effect: EffectFn = Arc::new(move || -> anyhow::Result<()> {
                info!(page, "Arrived on page");
                Ok(())
            });
            effect
        });

        library
    }

    /// Register a named effect, replacing any existing one
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&EffectResources, usize) -> EffectFn + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered effect names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Build the callback for `name` on `page`
    pub fn resolve(&self, name: &str, resources: &EffectResources, page: usize) -> Result<EffectFn, DeckError> {
        self.factories
            .get(name)
            .map(|factory| factory(resources, page))
            .ok_or_else(|| DeckError::UnknownEffect(name.to_string()))
    }
}

impl Default for EffectLibrary {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn burst_effect(bursts: BurstQueue, page: usize, kind: BurstKind) -> EffectFn {
    Arc::new(move || -> anyhow::Result<()> {
        bursts.emit(page, kind);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::CounterAnimation;

    #[test]
    fn test_builtin_names() {
        let library = EffectLibrary::with_builtins();
        assert_eq!(library.names(), vec!["confetti", "log", "particles", "stat-counter"]);
    }

    #[test]
    fn test_confetti_queues_burst_for_page() {
        let library = EffectLibrary::with_builtins();
        let resources = EffectResources::default();
        let effect = library.resolve("confetti", &resources, 2).unwrap();

        effect().unwrap();
        let bursts = resources.bursts.drain();
        assert_eq!(bursts.len(), 1);
        assert_eq!(bursts[0].page, 2);
        assert_eq!(bursts[0].kind, BurstKind::Confetti);
    }

    #[test]
    fn test_stat_counter_restarts_board() {
        let library = EffectLibrary::with_builtins();
        let resources = EffectResources {
            bursts: BurstQueue::new(),
            counters: CounterBoard::new(vec![CounterAnimation::new(100, 2000)]),
        };
        let effect = library.resolve("stat-counter", &resources, 1).unwrap();

        assert!(!resources.counters.is_running());
        effect().unwrap();
        assert!(resources.counters.is_running());
    }

    #[test]
    fn test_unknown_effect() {
        let library = EffectLibrary::with_builtins();
        let result = library.resolve("fireworks", &EffectResources::default(), 0);
        assert!(matches!(result, Err(DeckError::UnknownEffect(name)) if name == "fireworks"));
    }
}
