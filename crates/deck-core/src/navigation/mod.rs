use std::time::Instant;

use serde::{Deserialize, Serialize};

mod engine;
mod page;
mod subscriber;

pub use engine::PageNavigator;
pub use page::{Direction, PageDisplay};
pub use subscriber::IndicatorSync;

/// Snapshot of the navigator passed to observers
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationContext {
    pub current_page: usize,
    pub total_pages: usize,
    pub is_transitioning: bool,
    pub pages: Vec<PageDisplay>,
}

impl NavigationContext {
    /// Whether the back control should be shown
    pub fn can_go_back(&self) -> bool {
        self.current_page > 0
    }

    /// Whether there is a page after the current one
    pub fn can_go_forward(&self) -> bool {
        self.current_page + 1 < self.total_pages
    }
}

/// A transition that has begun its exit half
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
    pub direction: Direction,
    pub commit_at: Instant,
}

/// A committed arrival on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrival {
    pub from: usize,
    pub page: usize,
    pub direction: Direction,
}

/// Why a navigation request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Target outside the deck
    OutOfRange,
    /// Target is already the current page
    AlreadyCurrent,
    /// Another transition is still settling
    TransitionInFlight,
}

/// Result of a navigation request
///
/// Ignored requests are ordinary outcomes, not errors: callers typically
/// drop them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Started(Transition),
    Ignored(IgnoreReason),
}

impl NavigationOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, NavigationOutcome::Started(_))
    }
}
