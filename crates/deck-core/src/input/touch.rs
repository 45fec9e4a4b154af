//! Touch swipe recognition

use crate::navigation::Direction;

/// Minimum horizontal travel for a swipe
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 50.0;

/// Classifies touch displacement as a horizontal swipe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeDetector {
    threshold: f32,
}

impl Default for SwipeDetector {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SWIPE_THRESHOLD,
        }
    }
}

impl SwipeDetector {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Direction of a swipe with displacement `(dx, dy)`
    ///
    /// Positive `dx` moves forward. The horizontal travel must exceed the
    /// threshold and the vertical travel, otherwise the gesture is treated as
    /// a scroll.
    pub fn classify(&self, dx: f32, dy: f32) -> Option<Direction> {
        // Written positively so NaN displacement never qualifies
        let horizontal = dx.abs() > self.threshold && dx.abs() > dy.abs();
        if !horizontal {
            return None;
        }
        if dx > 0.0 {
            Some(Direction::Forward)
        } else {
            Some(Direction::Backward)
        }
    }
}

/// Tracks one touch from start to end
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchTracker {
    start: Option<(f32, f32)>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch_start(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
    }

    /// Finish the touch and return `(dx, dy)` as start minus end
    ///
    /// A finger moving left yields a positive `dx`.
    pub fn touch_end(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        self.start.take().map(|(sx, sy)| (sx - x, sy - y))
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}
