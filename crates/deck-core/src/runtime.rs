//! Async driver for a presentation
//!
//! Runs the whole deck on one task: input events and the settle-delay
//! deadline are awaited together, so a transition commits exactly when its
//! delay elapses even if no further input arrives.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::input::InputEvent;
use crate::navigation::{Arrival, NavigationOutcome};
use crate::state::Presentation;

/// Drives a [`Presentation`] from a channel of input events
pub struct NavigatorDriver<'a> {
    presentation: &'a Presentation,
    arrivals: Option<mpsc::UnboundedSender<Arrival>>,
}

impl<'a> NavigatorDriver<'a> {
    pub fn new(presentation: &'a Presentation) -> Self {
        Self {
            presentation,
            arrivals: None,
        }
    }

    /// Forward every committed arrival to `sender`
    pub fn with_arrivals(mut self, sender: mpsc::UnboundedSender<Arrival>) -> Self {
        self.arrivals = Some(sender);
        self
    }

    /// Run until the input channel closes
    ///
    /// A transition still settling when the channel closes is completed
    /// before returning.
    pub async fn run(self, mut inputs: mpsc::Receiver<InputEvent>) {
        let navigator = &self.presentation.navigator;

        loop {
            let deadline = navigator.pending_deadline().map(Instant::from_std);
            // Parked far in the future when nothing is pending
            let wake_at = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                event = inputs.recv() => match event {
                    Some(event) => self.apply(&event),
                    None => break,
                },
                _ = sleep_until(wake_at), if deadline.is_some() => self.commit(),
            }
        }

        if let Some(deadline) = navigator.pending_deadline() {
            sleep_until(Instant::from_std(deadline)).await;
            self.commit();
        }

        info!(page = navigator.current_page(), "Input closed, driver stopped");
    }

    fn apply(&self, event: &InputEvent) {
        let now = Instant::now().into_std();
        match self.presentation.handle_input(event, now) {
            Some(NavigationOutcome::Started(transition)) => {
                debug!(from = transition.from, to = transition.to, "Transition scheduled");
            }
            Some(NavigationOutcome::Ignored(reason)) => {
                debug!(?event, ?reason, "Navigation request ignored");
            }
            None => {}
        }
    }

    fn commit(&self) {
        let now = Instant::now().into_std();
        if let Some(arrival) = self.presentation.navigator.tick(now) {
            if let Some(sender) = &self.arrivals {
                // The receiver may have gone away; arrivals are informational
                let _ = sender.send(arrival);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeckConfig;
    use crate::input::Key;

    fn presentation() -> Presentation {
        Presentation::from_config(&DeckConfig::default()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_commits_after_delay() {
        let presentation = presentation();
        let (tx, rx) = mpsc::channel(8);
        let (arrivals_tx, mut arrivals_rx) = mpsc::unbounded_channel();

        let driver = NavigatorDriver::new(&presentation).with_arrivals(arrivals_tx);
        let run = driver.run(rx);
        let feed = async {
            tx.send(InputEvent::Key(Key::ArrowRight)).await.unwrap();
            let arrival = arrivals_rx.recv().await.unwrap();
            assert_eq!(arrival.page, 1);

            tx.send(InputEvent::GoTo(3)).await.unwrap();
            let arrival = arrivals_rx.recv().await.unwrap();
            assert_eq!(arrival.page, 3);
            drop(tx);
        };

        tokio::join!(run, feed);
        assert_eq!(presentation.navigator.current_page(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_during_transition_are_dropped() {
        let presentation = presentation();
        let (tx, rx) = mpsc::channel(8);

        tx.send(InputEvent::GoTo(1)).await.unwrap();
        tx.send(InputEvent::GoTo(3)).await.unwrap();
        drop(tx);

        NavigatorDriver::new(&presentation).run(rx).await;
        assert_eq!(presentation.navigator.current_page(), 1);
        assert!(!presentation.navigator.is_transitioning());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_transition_completes_on_close() {
        let presentation = presentation();
        let (tx, rx) = mpsc::channel(8);
        tx.send(InputEvent::Next).await.unwrap();
        drop(tx);

        let started = Instant::now();
        NavigatorDriver::new(&presentation).run(rx).await;
        assert!(started.elapsed() >= presentation.navigator.settle_delay());
        assert_eq!(presentation.navigator.current_page(), 1);
    }
}
