/*!
 * Allocator Configuration
 *
 * Runtime configuration for the header pool and coalescing policy
 */

use super::limits::{
    DEFAULT_CRITICAL_THRESHOLD, DEFAULT_HEADER_POOL_CAPACITY, DEFAULT_WARNING_THRESHOLD,
    MAX_HEADER_POOL_CAPACITY,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the header pool capacity
pub const ENV_HEADER_POOL: &str = "STCMEM_HEADER_POOL";
/// Environment variable toggling coalescing on free
pub const ENV_EAGER_COALESCE: &str = "STCMEM_EAGER_COALESCE";
/// Environment variable overriding the high pressure threshold
pub const ENV_WARNING_THRESHOLD: &str = "STCMEM_WARNING_THRESHOLD";
/// Environment variable overriding the critical pressure threshold
pub const ENV_CRITICAL_THRESHOLD: &str = "STCMEM_CRITICAL_THRESHOLD";

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Header pool capacity must be between 1 and {max}, got {capacity}")]
    PoolCapacity { capacity: usize, max: usize },

    #[error("Pressure thresholds must satisfy 0 < warning ({warning}) <= critical ({critical}) <= 1")]
    Thresholds { warning: f64, critical: f64 },

    #[error("Malformed configuration: {0}")]
    Malformed(String),
}

/// Allocator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Number of block headers shared by every list of one allocator
    pub header_pool_capacity: usize,
    /// Merge adjacent free blocks on every free (otherwise only when an allocation misses)
    pub eager_coalesce: bool,
    /// Usage ratio reported as high pressure
    pub warning_threshold: f64,
    /// Usage ratio reported as critical pressure
    pub critical_threshold: f64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            header_pool_capacity: DEFAULT_HEADER_POOL_CAPACITY,
            eager_coalesce: true,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
        }
    }
}

impl AllocatorConfig {
    /// Configuration with a specific header pool capacity
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.header_pool_capacity = capacity;
        self
    }

    /// Configuration with coalescing deferred to allocation misses
    pub fn with_lazy_coalesce(mut self) -> Self {
        self.eager_coalesce = false;
        self
    }

    /// Load configuration from the environment, falling back to defaults
    ///
    /// Environment variables:
    /// - STCMEM_HEADER_POOL: header pool capacity (default: 128)
    /// - STCMEM_EAGER_COALESCE: merge on free (default: true)
    /// - STCMEM_WARNING_THRESHOLD: high pressure ratio (default: 0.80)
    /// - STCMEM_CRITICAL_THRESHOLD: critical pressure ratio (default: 0.95)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = read_env(ENV_HEADER_POOL) {
            config.header_pool_capacity = parse(ENV_HEADER_POOL, &value)?;
        }
        if let Some(value) = read_env(ENV_EAGER_COALESCE) {
            config.eager_coalesce = parse_bool(ENV_EAGER_COALESCE, &value)?;
        }
        if let Some(value) = read_env(ENV_WARNING_THRESHOLD) {
            config.warning_threshold = parse(ENV_WARNING_THRESHOLD, &value)?;
        }
        if let Some(value) = read_env(ENV_CRITICAL_THRESHOLD) {
            config.critical_threshold = parse(ENV_CRITICAL_THRESHOLD, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.header_pool_capacity == 0 || self.header_pool_capacity > MAX_HEADER_POOL_CAPACITY {
            return Err(ConfigError::PoolCapacity {
                capacity: self.header_pool_capacity,
                max: MAX_HEADER_POOL_CAPACITY,
            });
        }

        let in_range = |t: f64| t > 0.0 && t <= 1.0;
        if !in_range(self.warning_threshold)
            || !in_range(self.critical_threshold)
            || self.warning_threshold > self.critical_threshold
        {
            return Err(ConfigError::Thresholds {
                warning: self.warning_threshold,
                critical: self.critical_threshold,
            });
        }

        Ok(())
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
