//! # Playback Error Types
//!
//! Error types for the control-plane side of playback. The delivery path on
//! the decoder thread never surfaces these; it converts every failure into an
//! accept/reject frame count.

use bridge_traits::{BridgeError, PcmFormat};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Track Resolution Errors
    // ========================================================================
    /// The decoder session does not know the track.
    #[error("Track unavailable: {0}")]
    TrackUnavailable(String),

    /// The track exists but the catalogue marks it as not playable.
    #[error("Track not playable: {0}")]
    NotPlayable(String),

    /// The track did not finish loading within the configured timeout.
    #[error("Timed out after {timeout:?} resolving {uri}")]
    ResolveTimeout { uri: String, timeout: Duration },

    // ========================================================================
    // Collaborator Errors
    // ========================================================================
    /// The decoder session or its player reported an error.
    #[error("Decoder error: {0}")]
    Decoder(#[from] BridgeError),

    /// The sink gave up switching to the new source.
    #[error("Sink aborted source switch: {0}")]
    IngestionAborted(String),

    /// The decoder delivered audio in a layout the sink is not configured for.
    #[error("Unsupported audio format: expected {expected}, got {actual}")]
    UnsupportedFormat { expected: PcmFormat, actual: PcmFormat },

    /// The chunk carries fewer bytes than its frame count requires.
    #[error("Truncated chunk: {frames} frames need {expected} bytes, got {actual}")]
    TruncatedChunk {
        frames: usize,
        expected: usize,
        actual: usize,
    },

    // ========================================================================
    // Playback Control Errors
    // ========================================================================
    /// Attempted operation when no track is loaded.
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Playback configuration failed validation.
    #[error("Invalid playback configuration: {0}")]
    InvalidConfig(#[from] core_runtime::Error),
}

impl PlaybackError {
    /// Map a failure from `DecoderSession::resolve` for `uri`.
    pub(crate) fn from_resolve(uri: &str, timeout: Duration, err: BridgeError) -> Self {
        match err {
            BridgeError::NotFound(_) => PlaybackError::TrackUnavailable(uri.to_string()),
            BridgeError::Timeout(_) => PlaybackError::ResolveTimeout {
                uri: uri.to_string(),
                timeout,
            },
            other => PlaybackError::Decoder(other),
        }
    }

    /// Returns `true` if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::ResolveTimeout { .. }
                | PlaybackError::IngestionAborted(_)
                | PlaybackError::Decoder(BridgeError::Timeout(_))
                | PlaybackError::Decoder(BridgeError::NotAvailable(_))
        )
    }

    /// Returns `true` if this error is an audio format mismatch. These point
    /// at a misconfigured decoder rather than at the track.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::UnsupportedFormat { .. } | PlaybackError::TruncatedChunk { .. }
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
