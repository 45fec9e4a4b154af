//! Page navigator implementation

use super::{
    Arrival, Direction, IgnoreReason, IndicatorSync, NavigationContext, NavigationOutcome, PageDisplay, Transition,
};
use crate::config::ConfigError;
use crate::effects::{invoke_isolated, EffectFn, EffectPolicy, EffectSink};
use crate::DeckError;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Navigator state stored internally
#[derive(Debug, Clone)]
struct NavigatorState {
    current_page: usize,
    pending: Option<Transition>,
    pages: Vec<PageDisplay>,
}

/// The page navigator
///
/// Owns the current page and sequences every transition in two halves: the
/// exit half runs immediately in [`go_to_page`](Self::go_to_page), the
/// enter half runs in [`tick`](Self::tick) once the settle delay has
/// elapsed. Only one transition can be in flight.
#[derive(Clone)]
pub struct PageNavigator {
    state: Arc<RwLock<NavigatorState>>,
    subscribers: Arc<RwLock<Vec<Weak<dyn IndicatorSync>>>>,
    effects: EffectSink,
    settle_delay: Duration,
}

impl PageNavigator {
    /// Create a navigator over `total_pages` pages, starting on page 0
    pub fn new(total_pages: usize, settle_delay: Duration) -> Result<Self, DeckError> {
        if total_pages == 0 {
            return Err(ConfigError::EmptyDeck.into());
        }

        let mut pages = vec![PageDisplay::Inactive; total_pages];
        pages[0] = PageDisplay::Active;

        let state = NavigatorState {
            current_page: 0,
            pending: None,
            pages,
        };

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            effects: EffectSink::new(),
            settle_delay,
        })
    }

    pub fn total_pages(&self) -> usize {
        self.state.read().pages.len()
    }

    /// The committed current page
    ///
    /// During a transition this is still the outgoing page.
    pub fn current_page(&self) -> usize {
        self.state.read().current_page
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.read().pending.is_some()
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// When the in-flight transition commits, if any
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.state.read().pending.map(|t| t.commit_at)
    }

    pub fn effects(&self) -> &EffectSink {
        &self.effects
    }

    /// Request a transition to `target`
    ///
    /// Out-of-range targets, the current page and requests made while a
    /// transition is settling are ignored.
    pub fn go_to_page(&self, target: i64, now: Instant) -> NavigationOutcome {
        let mut state = self.state.write();

        let to = match usize::try_from(target) {
            Ok(to) if to < state.pages.len() => to,
            _ => {
                debug!(requested = target, total = state.pages.len(), "Ignoring out-of-range page");
                return NavigationOutcome::Ignored(IgnoreReason::OutOfRange);
            }
        };

        if to == state.current_page {
            debug!(requested = target, "Ignoring request for current page");
            return NavigationOutcome::Ignored(IgnoreReason::AlreadyCurrent);
        }

        if let Some(pending) = state.pending {
            debug!(requested = target, in_flight = pending.to, "Ignoring request during transition");
            return NavigationOutcome::Ignored(IgnoreReason::TransitionInFlight);
        }

        let from = state.current_page;
        let direction = Direction::between(from, to);
        let transition = Transition {
            from,
            to,
            direction,
            commit_at: now + self.settle_delay,
        };

        state.pages[from] = PageDisplay::Exiting(direction);
        state.pages[to] = PageDisplay::Entering(direction);
        state.pending = Some(transition);

        debug!(from, to, ?direction, "Transition started");
        NavigationOutcome::Started(transition)
    }

    /// Navigate forward by one page
    pub fn next(&self, now: Instant) -> NavigationOutcome {
        let target = self.current_page() as i64 + 1;
        self.go_to_page(target, now)
    }

    /// Navigate backward by one page
    pub fn previous(&self, now: Instant) -> NavigationOutcome {
        let target = self.current_page() as i64 - 1;
        self.go_to_page(target, now)
    }

    /// Commit the in-flight transition if its settle delay has elapsed
    pub fn tick(&self, now: Instant) -> Option<Arrival> {
        let mut state = self.state.write();

        let transition = match state.pending {
            Some(t) if now >= t.commit_at => t,
            _ => return None,
        };

        state.pages[transition.from] = PageDisplay::Inactive;
        state.current_page = transition.to;
        state.pages[transition.to] = PageDisplay::Active;
        state.pending = None;

        drop(state);

        info!(page = transition.to, from = transition.from, "Arrived on page");
        self.notify_subscribers();
        self.effects.on_arrive(transition.to);

        Some(Arrival {
            from: transition.from,
            page: transition.to,
            direction: transition.direction,
        })
    }

    /// Register an arrival callback for a page, replacing any previous one
    pub fn register_effect(&self, page: usize, callback: EffectFn) -> Result<(), DeckError> {
        self.bind_effect(page, "custom", EffectPolicy::EveryArrival, callback)
    }

    /// Register a named arrival callback with an explicit fire policy
    pub fn bind_effect(
        &self,
        page: usize,
        name: impl Into<String>,
        policy: EffectPolicy,
        callback: EffectFn,
    ) -> Result<(), DeckError> {
        let total = self.total_pages();
        if page >= total {
            return Err(DeckError::PageOutOfRange { index: page, total });
        }
        self.effects.bind(page, name, policy, callback);
        Ok(())
    }

    /// Get current navigation context
    pub fn get_context(&self) -> NavigationContext {
        let state = self.state.read();
        NavigationContext {
            current_page: state.current_page,
            total_pages: state.pages.len(),
            is_transitioning: state.pending.is_some(),
            pages: state.pages.clone(),
        }
    }

    /// Add a subscriber and bring it up to date
    pub fn add_subscriber(&self, subscriber: Arc<dyn IndicatorSync>) {
        let (current, total) = {
            let state = self.state.read();
            (state.current_page, state.pages.len())
        };
        subscriber.update(current, total);

        let mut subscribers = self.subscribers.write();
        subscribers.push(Arc::downgrade(&subscriber));
    }

    /// Notify all subscribers of a committed page change
    fn notify_subscribers(&self) {
        let (current, total) = {
            let state = self.state.read();
            (state.current_page, state.pages.len())
        };

        let live: Vec<Arc<dyn IndicatorSync>> = {
            let mut subscribers = self.subscribers.write();
            // Remove any dead weak references
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        for subscriber in live {
            invoke_isolated(current, "indicator", || {
                subscriber.update(current, total);
                Ok(())
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DELAY: Duration = Duration::from_millis(300);

    #[derive(Default)]
    struct RecordingIndicator {
        updates: Mutex<Vec<(usize, usize)>>,
    }

    impl IndicatorSync for RecordingIndicator {
        fn update(&self, current_page: usize, total_pages: usize) {
            self.updates.lock().push((current_page, total_pages));
        }
    }

    fn navigator(pages: usize) -> PageNavigator {
        PageNavigator::new(pages, DELAY).unwrap()
    }

    #[test]
    fn test_empty_deck_rejected() {
        assert!(matches!(
            PageNavigator::new(0, DELAY),
            Err(DeckError::Config(ConfigError::EmptyDeck))
        ));
    }

    #[test]
    fn test_initial_state() {
        let nav = navigator(4);
        let ctx = nav.get_context();
        assert_eq!(ctx.current_page, 0);
        assert!(!ctx.is_transitioning);
        assert_eq!(ctx.pages[0], PageDisplay::Active);
        assert!(ctx.pages[1..].iter().all(|p| *p == PageDisplay::Inactive));
    }

    #[test]
    fn test_transition_commits_after_delay() {
        let nav = navigator(4);
        let start = Instant::now();

        let outcome = nav.go_to_page(1, start);
        assert!(outcome.is_started());
        assert!(nav.is_transitioning());
        assert_eq!(nav.current_page(), 0);
        assert_eq!(nav.get_context().pages[0], PageDisplay::Exiting(Direction::Forward));
        assert_eq!(nav.get_context().pages[1], PageDisplay::Entering(Direction::Forward));

        // Still holding before the settle delay
        assert_eq!(nav.tick(start + Duration::from_millis(299)), None);
        assert_eq!(nav.current_page(), 0);

        let arrival = nav.tick(start + DELAY).unwrap();
        assert_eq!(arrival.page, 1);
        assert_eq!(arrival.direction, Direction::Forward);
        assert_eq!(nav.current_page(), 1);
        assert!(!nav.is_transitioning());

        let ctx = nav.get_context();
        assert_eq!(ctx.pages[0], PageDisplay::Inactive);
        assert_eq!(ctx.pages[1], PageDisplay::Active);
    }

    #[test]
    fn test_backward_transition_uses_backward_exit() {
        let nav = navigator(4);
        let start = Instant::now();
        nav.go_to_page(3, start);
        nav.tick(start + DELAY);

        nav.go_to_page(1, start + DELAY);
        let ctx = nav.get_context();
        assert_eq!(ctx.pages[3], PageDisplay::Exiting(Direction::Backward));
        assert_eq!(ctx.pages[1], PageDisplay::Entering(Direction::Backward));
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let nav = navigator(4);
        let now = Instant::now();

        assert_eq!(nav.go_to_page(-1, now), NavigationOutcome::Ignored(IgnoreReason::OutOfRange));
        assert_eq!(nav.go_to_page(4, now), NavigationOutcome::Ignored(IgnoreReason::OutOfRange));
        assert_eq!(nav.previous(now), NavigationOutcome::Ignored(IgnoreReason::OutOfRange));
        assert_eq!(nav.current_page(), 0);
        assert!(!nav.is_transitioning());
    }

    #[test]
    fn test_out_of_range_during_transition_keeps_state() {
        let nav = navigator(4);
        let now = Instant::now();
        nav.go_to_page(2, now);

        assert_eq!(nav.go_to_page(9, now), NavigationOutcome::Ignored(IgnoreReason::OutOfRange));
        assert!(nav.is_transitioning());
        assert_eq!(nav.pending_deadline(), Some(now + DELAY));
    }

    #[test]
    fn test_current_page_is_noop() {
        let nav = navigator(4);
        let now = Instant::now();
        assert_eq!(nav.go_to_page(0, now), NavigationOutcome::Ignored(IgnoreReason::AlreadyCurrent));

        nav.go_to_page(2, now);
        assert_eq!(nav.go_to_page(0, now), NavigationOutcome::Ignored(IgnoreReason::AlreadyCurrent));
        nav.tick(now + DELAY);
        assert_eq!(nav.go_to_page(2, now + DELAY), NavigationOutcome::Ignored(IgnoreReason::AlreadyCurrent));
    }

    #[test]
    fn test_first_request_wins() {
        let nav = navigator(4);
        let now = Instant::now();
        nav.go_to_page(1, now);

        let second = nav.go_to_page(3, now + Duration::from_millis(50));
        assert_eq!(second, NavigationOutcome::Ignored(IgnoreReason::TransitionInFlight));

        nav.tick(now + DELAY);
        assert_eq!(nav.current_page(), 1);
        assert_eq!(nav.get_context().pages[3], PageDisplay::Inactive);
    }

    #[test]
    fn test_subscribers_synced() {
        let nav = navigator(4);
        let indicator = Arc::new(RecordingIndicator::default());
        nav.add_subscriber(indicator.clone());
        assert_eq!(*indicator.updates.lock(), vec![(0, 4)]);

        let now = Instant::now();
        nav.go_to_page(1, now);
        assert_eq!(indicator.updates.lock().len(), 1);

        nav.tick(now + DELAY);
        assert_eq!(*indicator.updates.lock(), vec![(0, 4), (1, 4)]);
    }

    #[test]
    fn test_dropped_subscriber_pruned() {
        let nav = navigator(2);
        let indicator = Arc::new(RecordingIndicator::default());
        nav.add_subscriber(indicator.clone());
        drop(indicator);

        let now = Instant::now();
        nav.go_to_page(1, now);
        nav.tick(now + DELAY);
        assert!(nav.subscribers.read().is_empty());
    }

    #[test]
    fn test_effect_fires_once_on_arrival() {
        let nav = navigator(4);
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in_effect = hits.clone();
        nav.register_effect(
            2,
            Arc::new(move || -> anyhow::Result<()> {
                hits_in_effect.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        )
        .unwrap();

        let mut now = Instant::now();
        for target in [1, 2] {
            nav.go_to_page(target, now);
            // Not fired before the transition commits
            assert_eq!(hits.load(Ordering::SeqCst), 0);
            now += DELAY;
            nav.tick(now);
            assert_eq!(hits.load(Ordering::SeqCst), if target == 2 { 1 } else { 0 });
        }
    }

    #[test]
    fn test_failing_effect_does_not_block_arrival() {
        let nav = navigator(3);
        nav.register_effect(1, Arc::new(|| -> anyhow::Result<()> { anyhow::bail!("no canvas") }))
            .unwrap();

        let now = Instant::now();
        nav.go_to_page(1, now);
        assert!(nav.tick(now + DELAY).is_some());
        assert_eq!(nav.current_page(), 1);
        assert!(!nav.is_transitioning());
    }

    struct PanickingIndicator;

    impl IndicatorSync for PanickingIndicator {
        fn update(&self, current_page: usize, _total_pages: usize) {
            if current_page > 0 {
                panic!("indicator detached");
            }
        }
    }

    #[test]
    fn test_panicking_subscriber_does_not_block_arrival() {
        let nav = navigator(3);
        let broken: Arc<dyn IndicatorSync> = Arc::new(PanickingIndicator);
        let recorder = Arc::new(RecordingIndicator::default());
        nav.add_subscriber(broken.clone());
        nav.add_subscriber(recorder.clone());

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        nav.register_effect(
            1,
            Arc::new(move || -> anyhow::Result<()> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        )
        .unwrap();

        let now = Instant::now();
        nav.go_to_page(1, now);
        let arrival = nav.tick(now + DELAY).unwrap();

        assert_eq!(arrival.page, 1);
        assert_eq!(nav.current_page(), 1);
        assert!(!nav.is_transitioning());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.updates.lock().last(), Some(&(1, 3)));
    }

    #[test]
    fn test_register_effect_out_of_range() {
        let nav = navigator(3);
        let result = nav.register_effect(3, Arc::new(|| -> anyhow::Result<()> { Ok(()) }));
        assert!(matches!(result, Err(DeckError::PageOutOfRange { index: 3, total: 3 })));
    }

    #[test]
    fn test_effect_can_navigate() {
        let nav = navigator(3);
        let handle = nav.clone();
        let start = Instant::now();
        let auto_advance_at = start + DELAY;
        nav.register_effect(
            1,
            Arc::new(move || -> anyhow::Result<()> {
                handle.next(auto_advance_at);
                Ok(())
            }),
        )
        .unwrap();

        nav.go_to_page(1, start);
        nav.tick(start + DELAY);
        assert!(nav.is_transitioning());
        nav.tick(start + DELAY * 2);
        assert_eq!(nav.current_page(), 2);
    }
}
