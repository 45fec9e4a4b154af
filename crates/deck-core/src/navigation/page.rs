use serde::{Deserialize, Serialize};

/// Direction of travel through the deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Direction needed to reach `to` from `from`
    pub fn between(from: usize, to: usize) -> Self {
        if to > from {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }
}

/// Declarative display state of a single page
///
/// The rendering layer reads these flags; the navigator never touches
/// presentation directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageDisplay {
    Inactive,
    Entering(Direction),
    Active,
    Exiting(Direction),
}

impl PageDisplay {
    pub fn is_active(&self) -> bool {
        matches!(self, PageDisplay::Active)
    }
}
