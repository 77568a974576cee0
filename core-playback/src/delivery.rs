//! # Audio Delivery Pipeline
//!
//! Runs on the decoder's delivery thread. Every decoded chunk passes through
//! [`DeliveryPipeline::deliver`], which answers with the number of frames
//! consumed. Returning `0` makes the decoder redeliver the same chunk later,
//! so rejection is the only backpressure signal it needs.
//!
//! ## Decision Order
//!
//! ```text
//!   chunk ─▶ seek in flight? ──yes──▶ drop (empty chunk completes the seek)
//!              │ no
//!              ▼
//!            end of stream pending? ──yes──▶ reject (drain, then end-of-stream)
//!              │ no
//!              ▼
//!            gate open? ───no───▶ reject
//!              │ yes
//!              ▼
//!            empty chunk? ──yes─▶ reject
//!              │ no
//!              ▼
//!            format and size ok? ──no──▶ reject
//!              │ yes
//!              ▼
//!            held queue drained into sink? ──no──▶ reject
//!              │ yes
//!              ▼
//!            hold new buffer, advance timestamp, accept
//! ```
//!
//! A newly accepted buffer is never pushed in the same call that accepts it.
//! It waits in the held queue and goes out at the start of the next delivery
//! (or the end-of-track flush). The sink therefore always sees buffers in
//! decode order, and the decoder never produces audio faster than the sink
//! drains it.
//!
//! End of track follows the same rules. If the gate is closed or the sink
//! refuses the tail, end-of-stream is held back and the decoder's following
//! deliveries keep draining until the sink has taken everything.

use crate::error::PlaybackError;
use crate::flow_control::FlowControlGate;
use crate::held_buffers::HeldBufferQueue;
use crate::seek::SeekCoordinator;
use crate::timestamp::{frames_to_clock_ticks, TimestampCounter};
use crate::SUPPORTED_FORMAT;
use bridge_traits::{AudioBuffer, AudioChunk, AudioSink, PcmFormat};
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Delivery statistics, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Buffers the sink has taken.
    pub buffers_pushed: u64,
    /// Frames accepted from the decoder.
    pub frames_accepted: u64,
    /// Chunks rejected because the sink asked for a pause in data.
    pub gate_closed_rejections: u64,
    /// Chunks rejected because the sink refused a held buffer.
    pub sink_busy_rejections: u64,
    /// Chunks dropped while a seek was in flight.
    pub chunks_discarded_during_seek: u64,
    /// End-of-stream signals sent to the sink.
    pub end_of_track_signals: u64,
    /// End-of-track notifications ignored as repeats.
    pub duplicate_end_of_track: u64,
}

/// Result of one delivery, as seen by the decoder event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Delivered {
    /// Frames consumed; `0` asks the decoder to redeliver.
    pub frames: usize,
    /// End-of-stream went out to the sink during this call.
    pub stream_ended: bool,
}

/// Decoder-to-sink delivery path.
///
/// Cheap to clone; every clone drives the same shared state.
#[derive(Clone)]
pub struct DeliveryPipeline {
    sink: Arc<dyn AudioSink>,
    gate: FlowControlGate,
    seek: SeekCoordinator,
    held: HeldBufferQueue,
    timestamp: TimestampCounter,
    end_of_stream_pending: Arc<AtomicBool>,
    // Serializes drains so two callers never interleave pushes.
    drain: Arc<Mutex<()>>,
    stats: Arc<Mutex<DeliveryStats>>,
}

impl DeliveryPipeline {
    pub fn new(
        sink: Arc<dyn AudioSink>,
        gate: FlowControlGate,
        seek: SeekCoordinator,
        held: HeldBufferQueue,
        timestamp: TimestampCounter,
    ) -> Self {
        Self {
            sink,
            gate,
            seek,
            held,
            timestamp,
            end_of_stream_pending: Arc::new(AtomicBool::new(false)),
            drain: Arc::new(Mutex::new(())),
            stats: Arc::new(Mutex::new(DeliveryStats::default())),
        }
    }

    /// Handle one chunk from the decoder. Returns the number of frames
    /// consumed: `chunk.num_frames` on acceptance (or discard during a seek),
    /// `0` on rejection.
    ///
    /// Never blocks beyond a single synchronous push attempt per held buffer.
    pub fn deliver(&self, chunk: AudioChunk<'_>) -> usize {
        self.deliver_chunk(chunk).frames
    }

    pub(crate) fn deliver_chunk(&self, chunk: AudioChunk<'_>) -> Delivered {
        // Observed before the seek check: any clear after this point makes
        // the chunk stale.
        let generation = self.held.generation();

        if self.seek.is_active() {
            if chunk.num_frames == 0 {
                self.seek.complete();
                debug!("Decoder confirmed seek");
            } else {
                self.stats.lock().chunks_discarded_during_seek += 1;
                trace!(frames = chunk.num_frames, "Discarding chunk during seek");
            }
            return consumed(chunk.num_frames);
        }

        if self.is_end_of_stream_pending() {
            return Delivered {
                frames: 0,
                stream_ended: self.try_finish_track(),
            };
        }

        if !self.gate.is_open() {
            self.stats.lock().gate_closed_rejections += 1;
            trace!("Sink requested pause in data, rejecting chunk");
            return consumed(0);
        }

        if chunk.is_empty() {
            return consumed(0);
        }

        let byte_len = match validate_chunk(&chunk) {
            Ok(byte_len) => byte_len,
            Err(e) => {
                error!("Rejecting chunk: {}", e);
                return consumed(0);
            }
        };

        if !self.drain_held() {
            self.stats.lock().sink_busy_rejections += 1;
            trace!(held = self.held.len(), "Sink busy, rejecting chunk");
            return consumed(0);
        }

        let duration = frames_to_clock_ticks(chunk.num_frames, chunk.format.sample_rate);
        let buffer = AudioBuffer::new(
            Bytes::copy_from_slice(&chunk.frames[..byte_len]),
            self.timestamp.get(),
            duration,
        );
        let timestamp = buffer.timestamp();

        let held = self.held.push_back_if_current(generation, buffer, |held| {
            self.timestamp.increase(held.duration());
        });
        if !held {
            self.stats.lock().chunks_discarded_during_seek += 1;
            debug!(frames = chunk.num_frames, "Queue cleared mid-delivery, dropping stale chunk");
            return consumed(chunk.num_frames);
        }

        trace!(timestamp, duration, frames = chunk.num_frames, "Holding buffer");
        self.stats.lock().frames_accepted += chunk.num_frames as u64;

        consumed(chunk.num_frames)
    }

    /// Push held buffers into the sink in FIFO order, stopping at the first
    /// rejection. Returns `true` if the queue ended up empty. Pushes nothing
    /// while the sink has asked for a pause in data.
    pub fn flush_held(&self) -> bool {
        if !self.gate.is_open() {
            trace!(held = self.held.len(), "Gate closed, holding tail buffers");
            return self.held.is_empty();
        }
        self.drain_held()
    }

    /// Start ending the track: drain what is held, then signal end-of-stream.
    ///
    /// Returns `true` if end-of-stream went out now. Otherwise it stays
    /// pending and a later delivery finishes the drain once the sink has
    /// room again.
    pub fn finish_track(&self) -> bool {
        self.end_of_stream_pending.store(true, Ordering::SeqCst);
        self.try_finish_track()
    }

    /// Whether end-of-stream is waiting for held buffers to drain.
    pub fn is_end_of_stream_pending(&self) -> bool {
        self.end_of_stream_pending.load(Ordering::SeqCst)
    }

    /// Drop a pending end-of-stream. Returns `true` if one was pending.
    pub(crate) fn cancel_end_of_stream(&self) -> bool {
        self.end_of_stream_pending.swap(false, Ordering::SeqCst)
    }

    fn try_finish_track(&self) -> bool {
        if !self.gate.is_open() {
            trace!(held = self.held.len(), "Gate closed, end of stream deferred");
            return false;
        }
        if !self.drain_held() {
            trace!(held = self.held.len(), "Sink busy, end of stream deferred");
            return false;
        }
        if !self.end_of_stream_pending.swap(false, Ordering::SeqCst) {
            return false;
        }

        self.sink.push_end_of_stream();
        self.stats.lock().end_of_track_signals += 1;
        true
    }

    fn drain_held(&self) -> bool {
        let _drain = self.drain.lock();
        while let Some((buffer, generation)) = self.held.pop_front() {
            match self.sink.push_buffer(buffer) {
                Ok(()) => {
                    self.stats.lock().buffers_pushed += 1;
                }
                Err(rejected) => {
                    let timestamp = rejected.timestamp();
                    if !self.held.push_front(rejected, generation) {
                        debug!(timestamp, "Queue cleared while buffer was at the sink, dropping it");
                    }
                    return false;
                }
            }
        }
        true
    }

    /// Snapshot of the delivery statistics.
    pub fn stats(&self) -> DeliveryStats {
        self.stats.lock().clone()
    }

    pub(crate) fn record_duplicate_end_of_track(&self) {
        self.stats.lock().duplicate_end_of_track += 1;
    }

    pub fn gate(&self) -> &FlowControlGate {
        &self.gate
    }

    pub fn seek(&self) -> &SeekCoordinator {
        &self.seek
    }

    pub fn held(&self) -> &HeldBufferQueue {
        &self.held
    }

    pub fn timestamp(&self) -> &TimestampCounter {
        &self.timestamp
    }
}

fn consumed(frames: usize) -> Delivered {
    Delivered {
        frames,
        stream_ended: false,
    }
}

/// Check the chunk's layout and size. Returns the payload length in bytes.
fn validate_chunk(chunk: &AudioChunk<'_>) -> Result<usize, PlaybackError> {
    validate_format(chunk.format)?;

    let expected = chunk
        .num_frames
        .checked_mul(chunk.format.bytes_per_frame())
        .unwrap_or(usize::MAX);
    if chunk.frames.len() < expected {
        return Err(PlaybackError::TruncatedChunk {
            frames: chunk.num_frames,
            expected,
            actual: chunk.frames.len(),
        });
    }
    Ok(expected)
}

fn validate_format(actual: PcmFormat) -> Result<(), PlaybackError> {
    if actual == SUPPORTED_FORMAT {
        Ok(())
    } else {
        Err(PlaybackError::UnsupportedFormat {
            expected: SUPPORTED_FORMAT,
            actual,
        })
    }
}
