//! PCM format descriptors and the buffer type exchanged with the sink.
//!
//! Timestamps and durations are expressed in sink clock ticks
//! (nanoseconds), the unit the downstream media pipeline schedules buffers in.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of sink clock ticks in one second.
pub const CLOCK_TICKS_PER_SECOND: u64 = 1_000_000_000;

/// Number of sink clock ticks in one millisecond.
pub const CLOCK_TICKS_PER_MILLISECOND: u64 = 1_000_000;

/// Sample encoding reported by the decoder for each delivered chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleType {
    /// 16-bit signed integer, little-endian.
    Int16LittleEndian,
    /// 16-bit signed integer, big-endian.
    Int16BigEndian,
    /// 32-bit IEEE float, little-endian.
    Float32LittleEndian,
}

impl SampleType {
    /// Size of a single sample in bytes.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleType::Int16LittleEndian | SampleType::Int16BigEndian => 2,
            SampleType::Float32LittleEndian => 4,
        }
    }

    fn caps_name(self) -> &'static str {
        match self {
            SampleType::Int16LittleEndian => "S16LE",
            SampleType::Int16BigEndian => "S16BE",
            SampleType::Float32LittleEndian => "F32LE",
        }
    }
}

/// Layout of interleaved PCM audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PcmFormat {
    /// Sample encoding.
    pub sample_type: SampleType,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
}

impl PcmFormat {
    /// Create a new PCM format descriptor.
    pub const fn new(sample_type: SampleType, sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_type,
            sample_rate,
            channels,
        }
    }

    /// 16-bit signed little-endian, interleaved stereo at 44.1 kHz.
    pub const fn cd_quality() -> Self {
        Self::new(SampleType::Int16LittleEndian, 44_100, 2)
    }

    /// Size of one frame (one sample for every channel) in bytes.
    pub fn bytes_per_frame(&self) -> usize {
        self.sample_type.bytes_per_sample() * self.channels as usize
    }

    /// Media-pipeline capability string describing this layout.
    pub fn caps(&self) -> String {
        format!(
            "audio/x-raw,format={},rate={},channels={},layout=interleaved",
            self.sample_type.caps_name(),
            self.sample_rate,
            self.channels
        )
    }
}

impl fmt::Display for PcmFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.caps())
    }
}

/// A timestamped block of raw PCM bytes ready for the sink.
///
/// Buffers are immutable once built. The payload is reference counted, so
/// handing a buffer back and forth between the held queue and the sink does
/// not copy sample data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    data: Bytes,
    timestamp: u64,
    duration: u64,
}

impl AudioBuffer {
    /// Create a buffer from raw bytes, a presentation timestamp and a duration,
    /// both in clock ticks.
    pub fn new(data: impl Into<Bytes>, timestamp: u64, duration: u64) -> Self {
        Self {
            data: data.into(),
            timestamp,
            duration,
        }
    }

    /// Raw sample bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Presentation timestamp in clock ticks.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Duration in clock ticks.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// Size of the payload in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cd_quality_caps() {
        let format = PcmFormat::cd_quality();
        assert_eq!(
            format.caps(),
            "audio/x-raw,format=S16LE,rate=44100,channels=2,layout=interleaved"
        );
        assert_eq!(format.to_string(), format.caps());
        assert_eq!(format.bytes_per_frame(), 4);
    }

    #[test]
    fn test_float_format_frame_size() {
        let format = PcmFormat::new(SampleType::Float32LittleEndian, 48_000, 6);
        assert_eq!(format.bytes_per_frame(), 24);
        assert_ne!(format, PcmFormat::cd_quality());
    }

    #[test]
    fn test_audio_buffer_accessors() {
        let buffer = AudioBuffer::new(vec![0u8; 8], 1_000, 2_000);
        assert_eq!(buffer.len(), 8);
        assert!(!buffer.is_empty());
        assert_eq!(buffer.timestamp(), 1_000);
        assert_eq!(buffer.duration(), 2_000);
    }
}
