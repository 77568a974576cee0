//! Audio sink bridge.
//!
//! The sink is the downstream media pipeline. It pulls data on its own
//! schedule and drives the producer through flow-control callbacks:
//!
//! ```text
//!   producer ──push_buffer()──▶ AudioSink ──▶ output
//!      ▲                           │
//!      └── need_data / enough_data / seek_data (IngestionHandler)
//! ```
//!
//! Callbacks arrive on the sink's own thread at arbitrary times relative to
//! buffer pushes.

use crate::audio::{AudioBuffer, PcmFormat};
use crate::error::Result;
use crate::track::TrackRef;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Resolves once the sink has fully switched to the newly configured source.
pub type IngestionReady = BoxFuture<'static, Result<()>>;

/// Flow-control and seek callbacks invoked by the sink.
pub trait IngestionHandler: Send + Sync {
    /// The sink's internal queue is running low.
    fn need_data(&self, length_hint: u32);

    /// The sink's internal queue is full; stop pushing.
    fn enough_data(&self);

    /// The sink needs data from `position_ms` onwards. Returns `true` if the
    /// request was accepted.
    fn seek_data(&self, position_ms: u64) -> bool;
}

/// Downstream audio output.
pub trait AudioSink: Send + Sync {
    /// Configure the ingestion endpoint for a new source with the given
    /// format and callbacks. The returned future resolves once the previous
    /// source has been cleanly replaced.
    fn configure_ingestion(
        &self,
        format: PcmFormat,
        handler: Arc<dyn IngestionHandler>,
    ) -> IngestionReady;

    /// Hand a buffer to the sink. On rejection the buffer is handed back so
    /// the caller can retry it later.
    fn push_buffer(&self, buffer: AudioBuffer) -> std::result::Result<(), AudioBuffer>;

    /// Signal that no more buffers follow for the current source.
    fn push_end_of_stream(&self);

    /// Publish metadata for the track that is about to play.
    fn set_metadata(&self, track: &TrackRef);
}
