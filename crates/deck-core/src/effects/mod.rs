//! Arrival effects
//!
//! The [`EffectSink`] receives one `on_arrive` notification per committed
//! page change and fans it out to the page's effect binding and to every
//! generic arrival listener. Each invocation is isolated: a failing or
//! panicking effect is logged and skipped.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

mod burst;
mod counter;
mod library;

pub use burst::{Burst, BurstKind, BurstQueue};
pub use counter::{format_thousands, CounterAnimation, CounterBoard, DEFAULT_DURATION_MS, FRAME_MS};
pub use library::{EffectFactory, EffectLibrary, EffectResources};

/// Zero-argument arrival callback
pub type EffectFn = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// When a page binding fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectPolicy {
    /// Exactly once per committed arrival
    #[default]
    EveryArrival,
    /// Only on the first committed arrival of the session
    FirstArrivalOnly,
}

struct EffectBinding {
    name: String,
    policy: EffectPolicy,
    callback: EffectFn,
    fired: usize,
}

impl EffectBinding {
    fn should_fire(&self) -> bool {
        match self.policy {
            EffectPolicy::EveryArrival => true,
            EffectPolicy::FirstArrivalOnly => self.fired == 0,
        }
    }
}

/// Listener notified on every arrival regardless of page
pub trait ArrivalListener: Send + Sync {
    fn on_arrive(&self, page: usize) -> anyhow::Result<()>;
}

/// Helper struct for creating listeners from closures
pub struct ClosureListener<F> {
    listener: F,
}

impl<F> ArrivalListener for ClosureListener<F>
where
    F: Fn(usize) -> anyhow::Result<()> + Send + Sync,
{
    fn on_arrive(&self, page: usize) -> anyhow::Result<()> {
        (self.listener)(page)
    }
}

/// Create an arrival listener from a closure
pub fn listener_from_fn<F>(f: F) -> Arc<dyn ArrivalListener>
where
    F: Fn(usize) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(ClosureListener { listener: f })
}

/// Outcome of one arrival dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub invoked: usize,
    pub failed: usize,
}

/// Page-indexed effect registry
#[derive(Clone, Default)]
pub struct EffectSink {
    bindings: Arc<RwLock<AHashMap<usize, EffectBinding>>>,
    listeners: Arc<RwLock<Vec<Arc<dyn ArrivalListener>>>>,
}

impl EffectSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an effect to a page, replacing any previous binding
    pub fn bind(&self, page: usize, name: impl Into<String>, policy: EffectPolicy, callback: EffectFn) {
        let name = name.into();
        let mut bindings = self.bindings.write();
        if let Some(previous) = bindings.get(&page) {
            debug!(page, old = %previous.name, new = %name, "Replacing effect binding");
        }
        bindings.insert(
            page,
            EffectBinding {
                name,
                policy,
                callback,
                fired: 0,
            },
        );
    }

    /// Remove the binding for a page
    pub fn unbind(&self, page: usize) -> bool {
        self.bindings.write().remove(&page).is_some()
    }

    /// Name of the effect bound to a page
    pub fn binding_name(&self, page: usize) -> Option<String> {
        self.bindings.read().get(&page).map(|b| b.name.clone())
    }

    /// Add a listener notified on every arrival
    pub fn add_listener(&self, listener: Arc<dyn ArrivalListener>) {
        self.listeners.write().push(listener);
    }

    /// Dispatch an arrival
    ///
    /// No lock is held while callbacks run, so a callback may navigate or
    /// register further effects.
    pub fn on_arrive(&self, page: usize) -> DispatchReport {
        let mut report = DispatchReport::default();

        let bound = {
            let mut bindings = self.bindings.write();
            match bindings.get_mut(&page) {
                Some(binding) if binding.should_fire() => {
                    binding.fired += 1;
                    Some((binding.name.clone(), binding.callback.clone()))
                }
                Some(binding) => {
                    debug!(page, effect = %binding.name, "Effect already fired, skipping");
                    None
                }
                None => None,
            }
        };

        if let Some((name, callback)) = bound {
            report.invoked += 1;
            if !invoke_isolated(page, &name, || callback()) {
                report.failed += 1;
            }
        }

        let listeners: Vec<_> = self.listeners.read().iter().cloned().collect();
        for listener in listeners {
            report.invoked += 1;
            if !invoke_isolated(page, "listener", || listener.on_arrive(page)) {
                report.failed += 1;
            }
        }

        report
    }
}

/// Run one callback, containing its error or panic
pub(crate) fn invoke_isolated<F>(page: usize, name: &str, f: F) -> bool
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            warn!(page, effect = name, error = %err, "Arrival effect failed");
            false
        }
        Err(_) => {
            warn!(page, effect = name, "Arrival effect panicked");
            false
        }
    }
}
