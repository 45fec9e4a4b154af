use std::sync::Arc;
use parking_lot::RwLock;

use crate::navigation::IndicatorSync;

/// Visual state of one progress dot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotState {
    /// Identifier of the dot in the rendering layer
    pub id: String,

    /// Whether this dot marks the current page
    pub active: bool,
}

/// Snapshot of every indicator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorSnapshot {
    pub dots: Vec<DotState>,
    pub back_visible: bool,
    pub back_control: Option<String>,
}

impl IndicatorSnapshot {
    /// Index of the active dot
    pub fn active_dot(&self) -> Option<usize> {
        self.dots.iter().position(|d| d.active)
    }
}

/// Progress dots and back control mirroring the navigator
///
/// Clones share the same snapshot.
#[derive(Clone)]
pub struct IndicatorState {
    snapshot: Arc<RwLock<IndicatorSnapshot>>,
}

impl IndicatorState {
    /// Create indicators with explicit dot identifiers
    pub fn new(dot_ids: Vec<String>, back_control: Option<String>) -> Self {
        let dots = dot_ids
            .into_iter()
            .map(|id| DotState { id, active: false })
            .collect();

        Self {
            snapshot: Arc::new(RwLock::new(IndicatorSnapshot {
                dots,
                back_visible: false,
                back_control,
            })),
        }
    }

    /// Create indicators with generated dot identifiers
    pub fn with_page_count(total_pages: usize, back_control: Option<String>) -> Self {
        let ids = (0..total_pages).map(|i| format!("dot-{}", i)).collect();
        Self::new(ids, back_control)
    }

    /// Get the current indicator state
    pub fn snapshot(&self) -> IndicatorSnapshot {
        self.snapshot.read().clone()
    }

    /// Compact one-line rendering, e.g. `< ○ ● ○ ○`
    pub fn render_line(&self) -> String {
        let snapshot = self.snapshot.read();
        let active = snapshot.active_dot();
        format_line(snapshot.dots.len(), active, snapshot.back_visible)
    }

    /// Rendering for `current_page` regardless of the live state
    ///
    /// Used when reporting an arrival after the navigator has already moved on.
    pub fn render_line_for(&self, current_page: usize, total_pages: usize) -> String {
        let dot_count = self.snapshot.read().dots.len().max(total_pages);
        format_line(dot_count, Some(current_page), current_page > 0)
    }
}

fn format_line(dot_count: usize, active: Option<usize>, back_visible: bool) -> String {
    let dots: Vec<&str> = (0..dot_count)
        .map(|i| if Some(i) == active { "●" } else { "○" })
        .collect();
    let back = if back_visible { "<" } else { " " };
    format!("{} {}", back, dots.join(" "))
}

impl IndicatorSync for IndicatorState {
    fn update(&self, current_page: usize, total_pages: usize) {
        let mut snapshot = self.snapshot.write();

        // Dots are optional in the rendering layer; fill in any that are missing
        while snapshot.dots.len() < total_pages {
            let id = format!("dot-{}", snapshot.dots.len());
            snapshot.dots.push(DotState { id, active: false });
        }

        for (index, dot) in snapshot.dots.iter_mut().enumerate() {
            dot.active = index == current_page;
        }
        snapshot.back_visible = current_page > 0;
    }
}
