//! Decoder session bridge.
//!
//! The decoder session turns track URIs into decoded PCM. It owns an internal
//! delivery thread that pushes every decoded chunk into the registered
//! [`DecoderEventHandler`] and reports end of track on a separate event.
//!
//! ## Threading Model
//!
//! - `on_audio_chunk` is called from the decoder's delivery thread, one chunk
//!   at a time. Implementations of the handler must not block beyond a short
//!   synchronous acknowledgment from the sink.
//! - `on_end_of_track` is called from the decoder's event loop and may fire
//!   more than once for the same track.
//! - Player commands (`load`, `play`, `pause`, `seek`, `unload`) are quick
//!   and may be issued from any thread.

use crate::audio::PcmFormat;
use crate::error::Result;
use crate::track::{TrackHandle, TrackLink};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Connection state of the decoder session towards the streaming service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    LoggedOut,
    LoggedIn,
    Disconnected,
    Offline,
}

impl ConnectionState {
    /// Returns `true` if the session can resolve links right now.
    pub fn is_logged_in(&self) -> bool {
        matches!(self, ConnectionState::LoggedIn)
    }
}

/// One delivery of decoded audio from the decoder thread.
///
/// A chunk with zero frames is meaningful: while a seek is in flight it
/// confirms the seek has completed.
#[derive(Debug, Clone, Copy)]
pub struct AudioChunk<'a> {
    /// Layout of `frames`.
    pub format: PcmFormat,
    /// Interleaved sample bytes, borrowed from the decoder for the duration of
    /// the call.
    pub frames: &'a [u8],
    /// Number of frames in `frames`.
    pub num_frames: usize,
}

impl<'a> AudioChunk<'a> {
    pub fn new(format: PcmFormat, frames: &'a [u8], num_frames: usize) -> Self {
        Self {
            format,
            frames,
            num_frames,
        }
    }

    /// Zero-length delivery.
    pub fn empty(format: PcmFormat) -> Self {
        Self::new(format, &[], 0)
    }

    /// Returns `true` if the chunk carries no audio.
    pub fn is_empty(&self) -> bool {
        self.num_frames == 0 || self.frames.is_empty()
    }
}

/// Receiver of decoder events. Registered once per session.
pub trait DecoderEventHandler: Send + Sync {
    /// Called for every decoded chunk. Returns the number of frames consumed;
    /// `0` asks the decoder to redeliver the same data later.
    fn on_audio_chunk(&self, chunk: AudioChunk<'_>) -> usize;

    /// Called when the decoder reaches the end of the current track.
    fn on_end_of_track(&self);
}

/// Transport controls of the decoder's player.
pub trait DecoderPlayer: Send + Sync {
    /// Load a resolved track into the player.
    fn load(&self, track: &TrackHandle) -> Result<()>;

    /// Start or resume producing audio.
    fn play(&self) -> Result<()>;

    /// Stop producing audio, keeping the track loaded.
    fn pause(&self) -> Result<()>;

    /// Seek to an absolute position in milliseconds.
    fn seek(&self, position_ms: u64) -> Result<()>;

    /// Unload the current track so no further chunks are delivered.
    fn unload(&self) -> Result<()>;
}

/// Session with the streaming decoder.
#[async_trait]
pub trait DecoderSession: Send + Sync {
    /// Resolve a track URI into a playable handle, waiting at most `timeout`
    /// for the track metadata to load.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotFound`](crate::BridgeError::NotFound) if the URI
    ///   does not name a track
    /// - [`BridgeError::Timeout`](crate::BridgeError::Timeout) if loading did
    ///   not finish in time
    async fn resolve(&self, uri: &str, timeout: Duration) -> Result<TrackHandle>;

    /// The session's player.
    fn player(&self) -> &dyn DecoderPlayer;

    /// Create a link for `uri` so the decoder can start loading it in the
    /// background.
    fn link(&self, uri: &str) -> Result<TrackLink>;

    /// Current connection state.
    fn connection_state(&self) -> ConnectionState;

    /// Register the handler receiving audio chunks and end-of-track events.
    fn subscribe(&self, handler: Arc<dyn DecoderEventHandler>);
}
