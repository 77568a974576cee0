//! # Track Lifecycle Controller
//!
//! Control-plane side of playback. Loads tracks into the decoder, switches
//! the sink over to the new source, and reacts to seek requests from the
//! sink and end-of-track notifications from the decoder.
//!
//! ## Playback State
//!
//! ```text
//!            load ok                pause
//!  Stopped ──────────▶ Playing ─────────────▶ Paused
//!     ▲   ◀── load fails  │  ◀───────────────   │
//!     │                   │       resume        │
//!     └──── stop / end of track ────────────────┘
//! ```
//!
//! `Loading` is only observable while a `load` call is in progress.
//!
//! ## Track Change
//!
//! Every `load` resets the shared delivery state before touching the decoder:
//! the timestamp goes back to 0, held buffers are dropped, any seek in flight
//! is abandoned, a deferred end-of-stream is dropped, and the end-of-track
//! latch and first-seek marker are re-armed. This happens even when the load
//! later fails.

use crate::callbacks::{DecoderEvents, IngestionCallbacks};
use crate::config::PlaybackConfig;
use crate::delivery::{DeliveryPipeline, DeliveryStats};
use crate::end_of_track::EndOfTrackFlag;
use crate::error::{PlaybackError, Result};
use crate::flow_control::FlowControlGate;
use crate::held_buffers::HeldBufferQueue;
use crate::links::TrackLinkCache;
use crate::seek::SeekCoordinator;
use crate::timestamp::{millis_to_clock_ticks, TimestampCounter};
use crate::SUPPORTED_FORMAT;
use bridge_traits::{AudioSink, DecoderSession, IngestionHandler, TrackRef};
use core_runtime::Error as RuntimeError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, instrument, warn};

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    Stopped,
    Loading,
    Playing,
    Paused,
}

/// Orchestrates track loading and transport control for one decoder
/// session and one sink.
///
/// Always handed out as `Arc<Self>`: the sink and decoder callbacks it
/// registers refer back to it weakly.
pub struct TrackLifecycleController {
    session: Arc<dyn DecoderSession>,
    sink: Arc<dyn AudioSink>,
    config: PlaybackConfig,
    gate: FlowControlGate,
    seek: SeekCoordinator,
    held: HeldBufferQueue,
    timestamp: TimestampCounter,
    end_of_track: EndOfTrackFlag,
    pipeline: DeliveryPipeline,
    links: TrackLinkCache,
    state: Mutex<PlaybackState>,
    current: Mutex<Option<TrackRef>>,
    events_connected: AtomicBool,
    weak_self: Weak<TrackLifecycleController>,
}

impl TrackLifecycleController {
    /// Create a controller.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::InvalidConfig`] if `config` fails validation.
    pub fn new(
        session: Arc<dyn DecoderSession>,
        sink: Arc<dyn AudioSink>,
        config: PlaybackConfig,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.link_cache_capacity).ok_or_else(|| {
            RuntimeError::Config("link_cache_capacity must be > 0".to_string())
        })?;

        let gate = FlowControlGate::new();
        let seek = SeekCoordinator::new();
        let held = HeldBufferQueue::new();
        let timestamp = TimestampCounter::default();
        let pipeline = DeliveryPipeline::new(
            Arc::clone(&sink),
            gate.clone(),
            seek.clone(),
            held.clone(),
            timestamp.clone(),
        );

        Ok(Arc::new_cyclic(|weak_self| Self {
            session,
            sink,
            config,
            gate,
            seek,
            held,
            timestamp,
            end_of_track: EndOfTrackFlag::new(),
            pipeline,
            links: TrackLinkCache::new(capacity),
            state: Mutex::new(PlaybackState::Stopped),
            current: Mutex::new(None),
            events_connected: AtomicBool::new(false),
            weak_self: weak_self.clone(),
        }))
    }

    /// Load `track` and switch the sink over to it.
    ///
    /// Resolves once the sink reports that the new source has fully replaced
    /// the previous one. Every failure is logged and reported as `false`.
    #[instrument(skip(self, track), fields(uri = %track.uri))]
    pub async fn load(&self, track: &TrackRef) -> bool {
        self.connect_events();

        *self.state.lock() = PlaybackState::Loading;
        self.reset_for_track_change();

        match self.switch_to(track).await {
            Ok(()) => {
                *self.current.lock() = Some(track.clone());
                *self.state.lock() = PlaybackState::Playing;
                info!("Track loaded");
                true
            }
            Err(e) => {
                *self.current.lock() = None;
                *self.state.lock() = PlaybackState::Stopped;
                info!("Failed to load track: {}", e);
                false
            }
        }
    }

    async fn switch_to(&self, track: &TrackRef) -> Result<()> {
        if track.uri.is_empty() {
            return Err(PlaybackError::TrackUnavailable("<empty uri>".to_string()));
        }
        if !track.playable {
            return Err(PlaybackError::NotPlayable(track.uri.clone()));
        }

        let timeout = self.config.resolve_timeout();
        let handle = self
            .session
            .resolve(&track.uri, timeout)
            .await
            .map_err(|e| PlaybackError::from_resolve(&track.uri, timeout, e))?;

        let player = self.session.player();
        player.load(&handle)?;
        player.play()?;

        let callbacks: Arc<dyn IngestionHandler> = Arc::new(IngestionCallbacks::new(
            self.gate.clone(),
            self.seek.clone(),
            self.weak_self.clone(),
        ));
        let ready = self.sink.configure_ingestion(SUPPORTED_FORMAT, callbacks);
        self.sink.set_metadata(track);

        debug!("Waiting for sink to switch sources");
        ready
            .await
            .map_err(|e| PlaybackError::IngestionAborted(e.to_string()))
    }

    fn reset_for_track_change(&self) {
        self.timestamp.reset();
        self.seek.arm_first_seek();
        self.seek.complete();
        self.gate.open();
        self.end_of_track.clear();
        self.pipeline.cancel_end_of_stream();
        let dropped = self.held.clear();
        if dropped > 0 {
            debug!(dropped, "Dropped held buffers from previous track");
        }
    }

    fn connect_events(&self) {
        if self.events_connected.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!("Subscribing to decoder events");
        let handler = DecoderEvents::new(self.pipeline.clone(), self.weak_self.clone());
        self.session.subscribe(Arc::new(handler));
    }

    /// Resume the loaded track.
    pub fn resume(&self) -> Result<()> {
        self.require_track()?;
        self.session.player().play()?;
        *self.state.lock() = PlaybackState::Playing;
        Ok(())
    }

    /// Pause the loaded track.
    pub fn pause(&self) -> Result<()> {
        self.require_track()?;
        self.session.player().pause()?;
        *self.state.lock() = PlaybackState::Paused;
        Ok(())
    }

    /// Stop playback. The decoder is paused the same way as for
    /// [`pause`](Self::pause).
    pub fn stop(&self) -> Result<()> {
        self.session.player().pause()?;
        *self.state.lock() = PlaybackState::Stopped;
        Ok(())
    }

    fn require_track(&self) -> Result<()> {
        if self.current.lock().is_some() {
            Ok(())
        } else {
            Err(PlaybackError::NoTrackLoaded)
        }
    }

    /// Handle a seek request from the sink. The seek coordinator has already
    /// been activated by the sink callback.
    ///
    /// The first request after a load is the sink initialising the new
    /// source; when it targets position 0 it is absorbed without reaching the
    /// decoder.
    pub fn on_seek_request(&self, position_ms: u64) {
        if self.seek.take_first_seek() && position_ms == 0 {
            self.seek.complete();
            debug!("Absorbed initial seek to 0");
            return;
        }

        if self.pipeline.cancel_end_of_stream() {
            self.end_of_track.clear();
            debug!("Seek cancelled pending end of stream");
        }

        let dropped = self.held.clear();
        self.timestamp.set(millis_to_clock_ticks(position_ms));
        debug!(position_ms, dropped, "Seeking decoder");

        if let Err(e) = self.session.player().seek(position_ms) {
            warn!("Decoder seek to {}ms failed: {}", position_ms, e);
            self.seek.complete();
        }
    }

    /// Handle the decoder's end-of-track notification. Only the first
    /// notification per track has any effect.
    ///
    /// Held buffers are drained before end-of-stream goes out. While the
    /// gate is closed or the sink refuses the tail, end-of-stream stays
    /// pending, the player stays loaded, and the decoder's following
    /// deliveries finish the job.
    pub fn on_end_of_track(&self) {
        if !self.end_of_track.try_set() {
            self.pipeline.record_duplicate_end_of_track();
            debug!("Ignoring repeated end of track");
            return;
        }

        if self.pipeline.finish_track() {
            self.complete_end_of_track();
        } else {
            debug!(
                remaining = self.held.len(),
                gate_open = self.gate.is_open(),
                "Sink not ready at end of track, end of stream deferred"
            );
        }
    }

    /// Unload the player once end-of-stream has reached the sink.
    pub(crate) fn complete_end_of_track(&self) {
        if let Err(e) = self.session.player().unload() {
            warn!("Failed to unload player: {}", e);
        }

        *self.current.lock() = None;
        *self.state.lock() = PlaybackState::Stopped;
        info!("End of track reached");
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.lock()
    }

    /// Track currently loaded, if any.
    pub fn current_track(&self) -> Option<TrackRef> {
        self.current.lock().clone()
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// The delivery pipeline fed by the decoder.
    pub fn pipeline(&self) -> &DeliveryPipeline {
        &self.pipeline
    }

    pub fn stats(&self) -> DeliveryStats {
        self.pipeline.stats()
    }

    pub fn links(&self) -> &TrackLinkCache {
        &self.links
    }

    /// Prefetch decoder links for `uris`. See [`TrackLinkCache::prefetch`].
    pub fn prefetch_links(&self, uris: &[String]) -> usize {
        self.links.prefetch(self.session.as_ref(), uris)
    }

    /// Drop all prefetched links.
    pub fn invalidate_links(&self) {
        self.links.invalidate();
    }
}
