//! Sink-driven flow control.
//!
//! The sink opens the gate when its queue runs low ("need data") and closes
//! it when full ("enough data"). The delivery pipeline reads the gate before
//! accepting any audio. Neither side ever blocks on it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Open/closed gate shared between the sink callbacks and the delivery
/// pipeline. Starts open.
#[derive(Debug, Clone)]
pub struct FlowControlGate {
    open: Arc<AtomicBool>,
}

impl FlowControlGate {
    pub fn new() -> Self {
        Self {
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::Release);
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

impl Default for FlowControlGate {
    fn default() -> Self {
        Self::new()
    }
}
