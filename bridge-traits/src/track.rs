//! Track identifiers passed between the host, the decoder and the sink.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Caller-owned reference to a track that should be played.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackRef {
    /// Opaque track URI understood by the decoder session.
    pub uri: String,
    /// Whether the catalogue reports this track as playable.
    #[serde(default = "default_playable")]
    pub playable: bool,
    /// Display name, surfaced to the sink as metadata.
    #[serde(default)]
    pub name: Option<String>,
}

fn default_playable() -> bool {
    true
}

impl TrackRef {
    /// Create a playable track reference.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            playable: true,
            name: None,
        }
    }

    /// Attach a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark the track as playable or not.
    pub fn with_playable(mut self, playable: bool) -> Self {
        self.playable = playable;
        self
    }
}

/// Decoder-side handle for a track that has been resolved and loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackHandle {
    /// URI the handle was resolved from.
    pub uri: String,
    /// Track duration, when the decoder knows it.
    pub duration: Option<Duration>,
}

impl TrackHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Lightweight decoder link for a URI. Holding a link lets the decoder start
/// loading track data in the background before playback is requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackLink {
    pub uri: String,
}

impl TrackLink {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}
