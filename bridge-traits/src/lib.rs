//! # Host Bridge Traits
//!
//! Contracts between the playback core and the external collaborators it
//! drives.
//!
//! ## Overview
//!
//! The core never decodes audio or talks to an audio device itself. It sits
//! between two components supplied by the host:
//!
//! - [`DecoderSession`](decoder::DecoderSession) - resolves track URIs and
//!   delivers decoded PCM chunks from its own internal thread
//! - [`AudioSink`](sink::AudioSink) - the downstream media pipeline that
//!   ingests timestamped buffers and exerts flow control
//!
//! ## Audio Format
//!
//! The bridge only ever carries one PCM layout:
//! [`PcmFormat::cd_quality`](audio::PcmFormat::cd_quality), 16-bit signed
//! little-endian, interleaved stereo at 44.1 kHz.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert their native failures into it with an actionable message.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`. Callbacks arrive on threads owned
//! by the collaborators.

pub mod audio;
pub mod decoder;
pub mod error;
pub mod sink;
pub mod track;

pub use error::{BridgeError, Result};

// Re-export commonly used types
pub use audio::{AudioBuffer, PcmFormat, SampleType, CLOCK_TICKS_PER_MILLISECOND, CLOCK_TICKS_PER_SECOND};
pub use decoder::{AudioChunk, ConnectionState, DecoderEventHandler, DecoderPlayer, DecoderSession};
pub use sink::{AudioSink, IngestionHandler, IngestionReady};
pub use track::{TrackHandle, TrackLink, TrackRef};
