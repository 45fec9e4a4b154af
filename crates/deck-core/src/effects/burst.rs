//! Particle and confetti bursts
//!
//! Bursts are queued for the rendering layer, which owns all geometry.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Kind of burst to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstKind {
    Confetti,
    Particles,
}

impl BurstKind {
    /// Default number of pieces emitted per burst
    pub fn default_count(&self) -> usize {
        match self {
            BurstKind::Confetti => 150,
            BurstKind::Particles => 30,
        }
    }
}

/// A requested burst
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    pub page: usize,
    pub kind: BurstKind,
    pub particle_count: usize,
    /// Seed for the renderer's random layout
    pub seed: u64,
}

/// Queue of bursts waiting to be rendered
#[derive(Debug, Clone, Default)]
pub struct BurstQueue {
    pending: Arc<Mutex<Vec<Burst>>>,
}

impl BurstQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a burst of `kind` for `page`
    pub fn emit(&self, page: usize, kind: BurstKind) -> Burst {
        let burst = Burst {
            page,
            kind,
            particle_count: kind.default_count(),
            seed: rand::random(),
        };
        self.pending.lock().push(burst.clone());
        burst
    }

    /// Take every queued burst
    pub fn drain(&self) -> Vec<Burst> {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Take the bursts queued for `page`, leaving the rest queued
    pub fn drain_page(&self, page: usize) -> Vec<Burst> {
        let mut pending = self.pending.lock();
        let (taken, kept): (Vec<Burst>, Vec<Burst>) = std::mem::take(&mut *pending)
            .into_iter()
            .partition(|burst| burst.page == page);
        *pending = kept;
        taken
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_drain() {
        let queue = BurstQueue::new();
        queue.emit(2, BurstKind::Confetti);
        queue.emit(3, BurstKind::Particles);
        assert_eq!(queue.len(), 2);

        let bursts = queue.drain();
        assert_eq!(bursts[0].page, 2);
        assert_eq!(bursts[0].particle_count, 150);
        assert_eq!(bursts[1].kind, BurstKind::Particles);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_page_keeps_other_pages() {
        let queue = BurstQueue::new();
        queue.emit(1, BurstKind::Particles);
        queue.emit(2, BurstKind::Confetti);

        let bursts = queue.drain_page(1);
        assert_eq!(bursts.len(), 1);
        assert_eq!(bursts[0].kind, BurstKind::Particles);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain_page(2)[0].page, 2);
        assert!(queue.is_empty());
    }
}
