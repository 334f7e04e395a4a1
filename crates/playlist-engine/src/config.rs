//! Engine configuration
//!
//! ```yaml
//! parallel_failure: settle_all
//! max_depth: 16
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading engine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse YAML
    #[error("failed to parse YAML engine config: {source}")]
    ParseYaml {
        #[source]
        source: serde_yaml::Error,
    },

    /// Failed to read a JSON value
    #[error("failed to parse JSON engine config: {source}")]
    ParseJson {
        #[source]
        source: serde_json::Error,
    },

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// How a parallel group reacts when one of its branches fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParallelFailure {
    /// Reject as soon as the first failure is observed; siblings keep running
    /// unobserved
    #[default]
    FailFast,

    /// Wait for every branch to settle, then reject with the first failure
    SettleAll,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Parallel group failure policy
    #[serde(default)]
    pub parallel_failure: ParallelFailure,

    /// Maximum group nesting depth accepted by the compiler
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// Nesting limit used when no configuration is given
pub const DEFAULT_MAX_DEPTH: usize = 64;

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel_failure: ParallelFailure::default(),
            max_depth: default_max_depth(),
        }
    }
}

impl EngineConfig {
    /// Load and validate from YAML
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|source| ConfigError::ParseYaml { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate from an already parsed JSON value
    pub fn from_json_value(value: Value) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_value(value).map_err(|source| ConfigError::ParseJson { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_depth".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_parallel_failure(mut self, policy: ParallelFailure) -> Self {
        self.parallel_failure = policy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
