//! FIFO of buffers accepted from the decoder but not yet taken by the sink.
//!
//! Every accepted chunk is parked here first. The next delivery drains the
//! queue into the sink from the front and stops at the first rejection, so
//! audio reaches the sink in decode order without gaps.
//!
//! Each [`clear`](HeldBufferQueue::clear) starts a new generation. A buffer
//! taken out under an older generation can no longer be put back, so a seek
//! or track change that lands while a buffer is out at the sink is never
//! undone by the rejection path.

use bridge_traits::AudioBuffer;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Default)]
struct HeldState {
    buffers: VecDeque<AudioBuffer>,
    generation: u64,
}

/// Shared, ordered queue of [`AudioBuffer`]s.
///
/// The lock is only held for a single queue operation. Callers never hold it
/// while talking to the sink, which keeps sink callbacks that clear the queue
/// from deadlocking against a delivery in progress.
#[derive(Debug, Clone, Default)]
pub struct HeldBufferQueue {
    state: Arc<Mutex<HeldState>>,
}

impl HeldBufferQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation. Bumped by every [`clear`](Self::clear).
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Append a freshly accepted buffer.
    pub fn push_back(&self, buffer: AudioBuffer) {
        self.state.lock().buffers.push_back(buffer);
    }

    /// Append `buffer` only if the queue has not been cleared since
    /// `generation` was observed. `on_append` runs under the queue lock just
    /// before the append, so a concurrent `clear` sees either both or neither.
    pub fn push_back_if_current(
        &self,
        generation: u64,
        buffer: AudioBuffer,
        on_append: impl FnOnce(&AudioBuffer),
    ) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            return false;
        }
        on_append(&buffer);
        state.buffers.push_back(buffer);
        true
    }

    /// Put a rejected buffer back at the head of the queue. The buffer is
    /// dropped, and `false` returned, if the queue was cleared after it was
    /// taken out.
    pub fn push_front(&self, buffer: AudioBuffer, generation: u64) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            return false;
        }
        state.buffers.push_front(buffer);
        true
    }

    /// Oldest buffer together with the generation it was taken under.
    pub fn pop_front(&self) -> Option<(AudioBuffer, u64)> {
        let mut state = self.state.lock();
        let generation = state.generation;
        state.buffers.pop_front().map(|buffer| (buffer, generation))
    }

    /// Clone of the oldest held buffer.
    pub fn peek_front(&self) -> Option<AudioBuffer> {
        self.state.lock().buffers.front().cloned()
    }

    /// Drop everything and start a new generation. Returns how many buffers
    /// were discarded.
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        let dropped = state.buffers.len();
        state.buffers.clear();
        state.generation = state.generation.wrapping_add(1);
        dropped
    }

    pub fn len(&self) -> usize {
        self.state.lock().buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().buffers.is_empty()
    }
}
