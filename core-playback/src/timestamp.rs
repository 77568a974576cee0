//! Presentation timestamp bookkeeping.
//!
//! The counter holds the timestamp, in sink clock ticks, that the next
//! accepted buffer will carry. It is written by the control thread (reset on
//! track change, set on seek) and advanced by the decoder's delivery thread.

use bridge_traits::{CLOCK_TICKS_PER_MILLISECOND, CLOCK_TICKS_PER_SECOND};
use parking_lot::Mutex;
use std::sync::Arc;

/// Thread-safe clock-tick counter shared between the controller and the
/// delivery pipeline. Cloning yields another handle to the same value.
#[derive(Debug, Clone, Default)]
pub struct TimestampCounter {
    value: Arc<Mutex<u64>>,
}

impl TimestampCounter {
    pub fn new(value: u64) -> Self {
        Self {
            value: Arc::new(Mutex::new(value)),
        }
    }

    pub fn get(&self) -> u64 {
        *self.value.lock()
    }

    pub fn set(&self, value: u64) {
        *self.value.lock() = value;
    }

    /// Back to the start of a track.
    pub fn reset(&self) {
        self.set(0);
    }

    /// Advance by `delta` ticks and return the new value.
    pub fn increase(&self, delta: u64) -> u64 {
        let mut value = self.value.lock();
        *value = value.saturating_add(delta);
        *value
    }
}

/// Convert a position in milliseconds to sink clock ticks.
pub fn millis_to_clock_ticks(position_ms: u64) -> u64 {
    position_ms.saturating_mul(CLOCK_TICKS_PER_MILLISECOND)
}

/// Duration of `frames` frames at `sample_rate`, in sink clock ticks,
/// rounded down.
pub fn frames_to_clock_ticks(frames: usize, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    let ticks = frames as u128 * CLOCK_TICKS_PER_SECOND as u128 / sample_rate as u128;
    u64::try_from(ticks).unwrap_or(u64::MAX)
}
