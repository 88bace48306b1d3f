use serde::{Deserialize, Serialize};

/// Enough entries for a full epoch of blocks carrying the maximum number of blobs.
pub const DEFAULT_ENGINE_BLOBS_CACHE_SIZE: usize = 32 * 16;
pub const DEFAULT_RETRY_TRACKER_SIZE: usize = 32;

#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Number of execution engine responses remembered, keyed by versioned hash.
    pub engine_blobs_cache_size: usize,
    /// Number of block roots remembered as already tried against the execution engine.
    pub retry_tracker_size: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            engine_blobs_cache_size: DEFAULT_ENGINE_BLOBS_CACHE_SIZE,
            retry_tracker_size: DEFAULT_RETRY_TRACKER_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: ResolverConfig = serde_json::from_str(r#"{"retry_tracker_size": 4}"#).unwrap();
        assert_eq!(config.retry_tracker_size, 4);
        assert_eq!(config.engine_blobs_cache_size, 512);
    }
}
