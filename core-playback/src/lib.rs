//! # Playback Delivery Bridge
//!
//! Moves decoded PCM from a streaming decoder into a downstream audio sink.
//!
//! ## Overview
//!
//! The decoder pushes audio from its own delivery thread; the sink pulls on
//! its own schedule and answers with flow-control and seek callbacks. This
//! crate sits between the two and provides:
//! - Backpressure, by rejecting chunks the sink cannot take yet
//! - Gapless track transitions, by holding every accepted buffer back one step
//! - Seek coordination, discarding audio decoded for the old position
//! - A single end-of-stream signal per track
//!
//! ## Data Flow
//!
//! ```text
//!  decoder thread                               sink thread
//!  ──────────────                               ───────────
//!  on_audio_chunk ──▶ DeliveryPipeline ──push──▶ AudioSink
//!                        │  reads                  │
//!                        ▼                         │ need_data / enough_data
//!   FlowControlGate  SeekCoordinator ◀─────────────┤ seek_data
//!   HeldBufferQueue  TimestampCounter              │
//!                        ▲                         ▼
//!  on_end_of_track ──▶ TrackLifecycleController ◀── on_seek_request
//!                        ▲
//!  control thread ───────┘ load / resume / pause / stop
//! ```
//!
//! Each shared object carries its own lock or atomic; no operation needs two
//! of them at once.

pub mod callbacks;
pub mod config;
pub mod controller;
pub mod delivery;
pub mod end_of_track;
pub mod error;
pub mod flow_control;
pub mod held_buffers;
pub mod links;
pub mod seek;
pub mod timestamp;

use bridge_traits::PcmFormat;

pub use callbacks::IngestionCallbacks;
pub use config::PlaybackConfig;
pub use controller::{PlaybackState, TrackLifecycleController};
pub use delivery::{DeliveryPipeline, DeliveryStats};
pub use end_of_track::EndOfTrackFlag;
pub use error::{PlaybackError, Result};
pub use flow_control::FlowControlGate;
pub use held_buffers::HeldBufferQueue;
pub use links::TrackLinkCache;
pub use seek::SeekCoordinator;
pub use timestamp::{frames_to_clock_ticks, millis_to_clock_ticks, TimestampCounter};

/// The only PCM layout the bridge carries: 16-bit signed little-endian,
/// interleaved stereo at 44.1 kHz.
pub const SUPPORTED_FORMAT: PcmFormat = PcmFormat::cd_quality();
