//! # Playback Configuration
//!
//! Settings consumed by the track lifecycle controller. Loading them from a
//! file or settings store is left to the host; this module only parses and
//! validates.

use core_runtime::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Maximum time to wait for the decoder to resolve a track, in
    /// milliseconds.
    ///
    /// Default: 10 seconds.
    #[serde(default = "default_resolve_timeout_ms")]
    pub resolve_timeout_ms: u64,

    /// Maximum number of prefetched track links kept in memory.
    ///
    /// Default: 1000.
    #[serde(default = "default_link_cache_capacity")]
    pub link_cache_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            resolve_timeout_ms: default_resolve_timeout_ms(),
            link_cache_capacity: default_link_cache_capacity(),
        }
    }
}

impl PlaybackConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid playback config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the resolution timeout. Saturates at `u64::MAX` milliseconds.
    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the link cache capacity.
    pub fn with_link_cache_capacity(mut self, capacity: usize) -> Self {
        self.link_cache_capacity = capacity;
        self
    }

    /// Resolution timeout as a [`Duration`].
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.resolve_timeout_ms == 0 {
            return Err(Error::Config("resolve_timeout_ms must be > 0".to_string()));
        }

        if self.link_cache_capacity == 0 {
            return Err(Error::Config("link_cache_capacity must be > 0".to_string()));
        }

        Ok(())
    }
}

fn default_resolve_timeout_ms() -> u64 {
    10_000
}

fn default_link_cache_capacity() -> usize {
    1_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlaybackConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resolve_timeout(), Duration::from_secs(10));
        assert_eq!(config.link_cache_capacity, 1_000);
    }

    #[test]
    fn test_config_validation() {
        let mut config = PlaybackConfig::default();

        config.resolve_timeout_ms = 0;
        assert!(config.validate().is_err());
        config.resolve_timeout_ms = 5_000;

        config.link_cache_capacity = 0;
        assert!(config.validate().is_err());
        config.link_cache_capacity = 10;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = PlaybackConfig::from_json(r#"{"resolve_timeout_ms": 2500}"#).unwrap();
        assert_eq!(config.resolve_timeout(), Duration::from_millis(2500));
        assert_eq!(config.link_cache_capacity, 1_000);
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        assert!(matches!(
            PlaybackConfig::from_json(r#"{"resolve_timeout_ms": 0}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PlaybackConfig::from_json("not json"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_builders() {
        let config = PlaybackConfig::default()
            .with_resolve_timeout(Duration::from_secs(3))
            .with_link_cache_capacity(42);
        assert_eq!(config.resolve_timeout_ms, 3_000);
        assert_eq!(config.link_cache_capacity, 42);
    }

    #[test]
    fn test_huge_resolve_timeout_saturates() {
        let config = PlaybackConfig::default().with_resolve_timeout(Duration::MAX);
        assert_eq!(config.resolve_timeout_ms, u64::MAX);
        assert!(config.validate().is_ok());
        assert_eq!(config.resolve_timeout(), Duration::from_millis(u64::MAX));
    }
}
