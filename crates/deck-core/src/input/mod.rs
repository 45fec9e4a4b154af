//! Input adapters
//!
//! Buttons, dots, the back control, the keyboard and touch swipes all reduce
//! to a single `go_to_page` call on the navigator.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::navigation::{Direction, NavigationOutcome, PageNavigator};

mod touch;

pub use touch::{SwipeDetector, TouchTracker, DEFAULT_SWIPE_THRESHOLD};

/// A keyboard key as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    ArrowUp,
    ArrowDown,
    Space,
    Enter,
    Escape,
    Other(String),
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        match name {
            "ArrowRight" | "Right" => Key::ArrowRight,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            " " | "Space" | "Spacebar" => Key::Space,
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::from(name.as_str())
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::ArrowRight => write!(f, "ArrowRight"),
            Key::ArrowLeft => write!(f, "ArrowLeft"),
            Key::ArrowUp => write!(f, "ArrowUp"),
            Key::ArrowDown => write!(f, "ArrowDown"),
            Key::Space => write!(f, "Space"),
            Key::Enter => write!(f, "Enter"),
            Key::Escape => write!(f, "Escape"),
            Key::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Keys that move through the deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub forward: Vec<Key>,
    pub backward: Vec<Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: vec![Key::ArrowRight, Key::Space],
            backward: vec![Key::ArrowLeft],
        }
    }
}

impl KeyBindings {
    /// Direction bound to `key`, if any
    pub fn direction_for(&self, key: &Key) -> Option<Direction> {
        if self.forward.contains(key) {
            Some(Direction::Forward)
        } else if self.backward.contains(key) {
            Some(Direction::Backward)
        } else {
            None
        }
    }
}

/// Input delivered to the navigator
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A button or dot targeting a specific page
    GoTo(i64),
    /// A "next" control
    Next,
    /// The back control
    Back,
    /// A key press
    Key(Key),
    /// A completed touch gesture, displacement measured start minus end
    Swipe { dx: f32, dy: f32 },
}

/// Maps raw input events onto navigation targets
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    keys: KeyBindings,
    swipe: SwipeDetector,
}

impl InputRouter {
    pub fn new(keys: KeyBindings, swipe: SwipeDetector) -> Self {
        Self { keys, swipe }
    }

    pub fn keys(&self) -> &KeyBindings {
        &self.keys
    }

    pub fn swipe(&self) -> &SwipeDetector {
        &self.swipe
    }

    /// Page the event asks for, given the current page
    pub fn target_for(&self, event: &InputEvent, current_page: usize) -> Option<i64> {
        let current = current_page as i64;
        let step = |direction: Direction| match direction {
            Direction::Forward => current + 1,
            Direction::Backward => current - 1,
        };

        match event {
            InputEvent::GoTo(page) => Some(*page),
            InputEvent::Next => Some(current + 1),
            InputEvent::Back => Some(current - 1),
            InputEvent::Key(key) => self.keys.direction_for(key).map(step),
            InputEvent::Swipe { dx, dy } => self.swipe.classify(*dx, *dy).map(step),
        }
    }

    /// Apply an event to the navigator
    ///
    /// Returns `None` when the event is not a navigation gesture at all.
    pub fn dispatch(&self, navigator: &PageNavigator, event: &InputEvent, now: Instant) -> Option<NavigationOutcome> {
        let Some(target) = self.target_for(event, navigator.current_page()) else {
            trace!(?event, "Input not bound to navigation");
            return None;
        };
        Some(navigator.go_to_page(target, now))
    }
}
