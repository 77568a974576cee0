//! Seek transition tracking.
//!
//! A seek starts when the sink asks for data from a new position and ends
//! when the decoder confirms it with a zero-length delivery. Everything the
//! decoder delivers in between was produced for the old position and is
//! dropped.
//!
//! The coordinator also remembers whether the current track has seen its
//! first seek request yet: the sink issues a seek to position 0 while it
//! initialises a new source, and that request must not reach the decoder.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct SeekState {
    active: AtomicBool,
    first_seek_pending: AtomicBool,
}

/// Shared seek state. Cloning yields another handle to the same state.
#[derive(Debug, Clone, Default)]
pub struct SeekCoordinator {
    state: Arc<SeekState>,
}

impl SeekCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a seek as in flight. Audio is discarded until [`complete`](Self::complete).
    pub fn begin(&self) {
        self.state.active.store(true, Ordering::Release);
    }

    /// Mark the seek as finished.
    pub fn complete(&self) {
        self.state.active.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.state.active.load(Ordering::Acquire)
    }

    /// Called on every track change.
    pub fn arm_first_seek(&self) {
        self.state.first_seek_pending.store(true, Ordering::Release);
    }

    /// Consume the first-seek marker. Returns `true` only for the first seek
    /// request after [`arm_first_seek`](Self::arm_first_seek).
    pub fn take_first_seek(&self) -> bool {
        self.state.first_seek_pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_first_seek_pending(&self) -> bool {
        self.state.first_seek_pending.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_and_complete() {
        let seek = SeekCoordinator::new();
        assert!(!seek.is_active());

        seek.begin();
        assert!(seek.is_active());
        seek.complete();
        assert!(!seek.is_active());
    }

    #[test]
    fn test_first_seek_is_consumed_once() {
        let seek = SeekCoordinator::new();
        assert!(!seek.take_first_seek());

        seek.arm_first_seek();
        assert!(seek.is_first_seek_pending());
        assert!(seek.take_first_seek());
        assert!(!seek.take_first_seek());
        assert!(!seek.is_first_seek_pending());
    }
}
