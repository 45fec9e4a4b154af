//! Animated stat counters
//!
//! A counter climbs from zero to its target in fixed frame steps. While
//! climbing it shows the floored running value; once the running value
//! reaches the target it shows the target exactly and stops.

use std::sync::Arc;

use parking_lot::RwLock;

/// Frame interval the counter is stepped at
pub const FRAME_MS: u64 = 16;

/// Default time for a counter to reach its target
pub const DEFAULT_DURATION_MS: u64 = 2000;

/// A single counter animation
#[derive(Debug, Clone, PartialEq)]
pub struct CounterAnimation {
    target: u64,
    increment: f64,
    current: f64,
    displayed: u64,
    finished: bool,
}

impl CounterAnimation {
    pub fn new(target: u64, duration_ms: u64) -> Self {
        let frames = (duration_ms as f64 / FRAME_MS as f64).max(1.0);
        Self {
            target,
            increment: target as f64 / frames,
            current: 0.0,
            displayed: 0,
            finished: false,
        }
    }

    /// Advance one frame and return the displayed value
    pub fn step(&mut self) -> u64 {
        if self.finished {
            return self.displayed;
        }

        self.current += self.increment;
        if self.current < self.target as f64 {
            self.displayed = self.current.floor() as u64;
        } else {
            self.displayed = self.target;
            self.finished = true;
        }
        self.displayed
    }

    /// Start over from zero
    pub fn reset(&mut self) {
        self.current = 0.0;
        self.displayed = 0;
        self.finished = false;
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn displayed(&self) -> u64 {
        self.displayed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Displayed value with thousands separators
    pub fn display(&self) -> String {
        format_thousands(self.displayed)
    }
}

/// Format an integer with comma thousands separators
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Set of counters shown on a stats page
#[derive(Debug, Clone, Default)]
pub struct CounterBoard {
    counters: Arc<RwLock<Vec<CounterAnimation>>>,
    running: Arc<RwLock<bool>>,
}

impl CounterBoard {
    pub fn new(counters: Vec<CounterAnimation>) -> Self {
        Self {
            counters: Arc::new(RwLock::new(counters)),
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Reset every counter and start animating
    pub fn restart(&self) {
        for counter in self.counters.write().iter_mut() {
            counter.reset();
        }
        *self.running.write() = true;
    }

    pub fn is_running(&self) -> bool {
        *self.running.read()
    }

    /// Advance every counter one frame; returns whether any is still climbing
    pub fn tick_frame(&self) -> bool {
        if !self.is_running() {
            return false;
        }

        let mut counters = self.counters.write();
        for counter in counters.iter_mut() {
            counter.step();
        }
        let still_running = counters.iter().any(|c| !c.is_finished());
        *self.running.write() = still_running;
        still_running
    }

    /// Current formatted values
    pub fn displays(&self) -> Vec<String> {
        self.counters.read().iter().map(|c| c.display()).collect()
    }

    pub fn len(&self) -> usize {
        self.counters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
