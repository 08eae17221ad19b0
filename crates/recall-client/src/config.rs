//! Orchestrator configuration.
//!
//! Defines the tuning options for the query orchestrator and the patch type
//! used to adjust them at runtime without reconstructing the instance.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning options for the query orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Minimum normalized query length before a lookup is considered (default: 3)
    pub min_length: usize,

    /// Quiet period after the last input event before dispatching (default: 75ms)
    pub debounce: Duration,

    /// How long a cached result stays servable (default: 60s)
    pub cache_ttl: Duration,

    /// Serve results from the cache when fresh (default: true)
    pub use_cache: bool,

    /// After a cache hit, still dispatch a live fetch to refresh (default: false)
    pub refresh_on_cache: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            min_length: 3,
            debounce: Duration::from_millis(75),
            cache_ttl: Duration::from_secs(60),
            use_cache: true,
            refresh_on_cache: false,
        }
    }
}

impl OrchestratorConfig {
    /// Set the minimum query length
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Set the debounce quiet period
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the cache TTL
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    /// Enable or disable cache reads
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Enable or disable live refresh after a cache hit
    pub fn with_refresh_on_cache(mut self, refresh_on_cache: bool) -> Self {
        self.refresh_on_cache = refresh_on_cache;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.min_length == 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "min_length".into(),
                message: "must be greater than 0; the empty query means no active query".into(),
            });
        }

        if self.use_cache && self.cache_ttl.is_zero() {
            return Err(ConfigValidationError::InvalidValue {
                field: "cache_ttl".into(),
                message: "must be greater than 0 when use_cache is enabled".into(),
            });
        }

        Ok(())
    }

    /// Merge a partial update into this configuration
    pub fn apply(&mut self, patch: ConfigPatch) {
        if let Some(min_length) = patch.min_length {
            self.min_length = min_length;
        }
        if let Some(debounce) = patch.debounce {
            self.debounce = debounce;
        }
        if let Some(cache_ttl) = patch.cache_ttl {
            self.cache_ttl = cache_ttl;
        }
        if let Some(use_cache) = patch.use_cache {
            self.use_cache = use_cache;
        }
        if let Some(refresh_on_cache) = patch.refresh_on_cache {
            self.refresh_on_cache = refresh_on_cache;
        }
    }
}

/// Partial configuration update applied at runtime.
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigPatch {
    pub min_length: Option<usize>,
    pub debounce: Option<Duration>,
    pub cache_ttl: Option<Duration>,
    pub use_cache: Option<bool>,
    pub refresh_on_cache: Option<bool>,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
