//! Pipeline configuration that downstream crates can serialize/deserialize.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capacity of the hand-off queue between a producer and a channel cursor.
    pub channel_capacity: usize,

    /// Default byte target for size-bounded chunking.
    pub chunk_target_bytes: u64,

    /// Upper bound on the number of sources fed into one k-way merge.
    pub merge_max_sources: usize,

    /// Name prefix for producer threads spawned by the exec crate.
    pub producer_thread_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            chunk_target_bytes: 1024 * 1024, // 1 MiB
            merge_max_sources: 256,
            producer_thread_prefix: "lazyseq-producer".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `LAZYSEQ_CHANNEL_CAPACITY`: hand-off queue capacity
    /// - `LAZYSEQ_CHUNK_TARGET_BYTES`: chunk byte target
    /// - `LAZYSEQ_MERGE_MAX_SOURCES`: merge fan-in limit
    /// - `LAZYSEQ_PRODUCER_THREAD_PREFIX`: producer thread name prefix
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    /// Overlay environment variables onto an existing config.
    /// Unparseable values are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(s) = std::env::var("LAZYSEQ_CHANNEL_CAPACITY") {
            if let Ok(v) = s.parse::<usize>() {
                self.channel_capacity = v;
            }
        }

        if let Ok(s) = std::env::var("LAZYSEQ_CHUNK_TARGET_BYTES") {
            if let Ok(v) = s.parse::<u64>() {
                self.chunk_target_bytes = v;
            }
        }

        if let Ok(s) = std::env::var("LAZYSEQ_MERGE_MAX_SOURCES") {
            if let Ok(v) = s.parse::<usize>() {
                self.merge_max_sources = v;
            }
        }

        if let Ok(s) = std::env::var("LAZYSEQ_PRODUCER_THREAD_PREFIX") {
            self.producer_thread_prefix = s;
        }
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be > 0".into()));
        }
        if self.chunk_target_bytes == 0 {
            return Err(ConfigError::Invalid("chunk_target_bytes must be > 0".into()));
        }
        if self.merge_max_sources == 0 {
            return Err(ConfigError::Invalid("merge_max_sources must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = PipelineConfig::from_json_str(r#"{ "channel_capacity": 8 }"#).unwrap();
        assert_eq!(cfg.channel_capacity, 8);
        assert_eq!(cfg.chunk_target_bytes, 1024 * 1024);
        assert_eq!(cfg.producer_thread_prefix, "lazyseq-producer");
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = PipelineConfig::from_json_str(r#"{ "channel_capacity": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = PipelineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
