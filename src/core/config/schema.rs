//! core::config::schema
//!
//! Configuration schema types.
//!
//! # File
//!
//! Located at (in order of precedence):
//! 1. `$COMMIT_LANES_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/commit-lanes/config.toml`
//! 3. `~/.commit-lanes/config.toml`
//!
//! # Validation
//!
//! Values are validated after parsing so a bad file is reported at load
//! time instead of surfacing as odd behavior later.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Upper bound for `cache.initial_capacity`.
pub const MAX_INITIAL_CAPACITY: usize = 10_000_000;

/// Configuration file contents.
///
/// # Example
///
/// ```toml
/// [cache]
/// initial_capacity = 100003
///
/// [log]
/// debug = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LanesConfig {
    /// Revision cache sizing
    pub cache: Option<CacheConfig>,

    /// Diagnostic output
    pub log: Option<LogConfig>,
}

impl LanesConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(cache) = &self.cache {
            cache.validate()?;
        }
        if let Some(log) = &self.log {
            log.validate()?;
        }
        Ok(())
    }
}

/// Revision cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Rows to reserve up front
    pub initial_capacity: Option<usize>,
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(capacity) = self.initial_capacity {
            if capacity > MAX_INITIAL_CAPACITY {
                return Err(ConfigError::InvalidValue(format!(
                    "cache.initial_capacity {} exceeds maximum {}",
                    capacity, MAX_INITIAL_CAPACITY
                )));
            }
        }
        Ok(())
    }
}

/// Diagnostic output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Trace layout decisions on stderr
    pub debug: Option<bool>,

    /// Suppress all diagnostics
    pub quiet: Option<bool>,
}

impl LogConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debug == Some(true) && self.quiet == Some(true) {
            return Err(ConfigError::InvalidValue(
                "log.debug and log.quiet cannot both be enabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LanesConfig::default();
        assert!(config.cache.is_none());
        assert!(config.log.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn capacity_bounded() {
        let config = LanesConfig {
            cache: Some(CacheConfig {
                initial_capacity: Some(MAX_INITIAL_CAPACITY + 1),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_and_quiet_conflict() {
        let config = LanesConfig {
            log: Some(LogConfig {
                debug: Some(true),
                quiet: Some(true),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn roundtrip() {
        let config = LanesConfig {
            cache: Some(CacheConfig {
                initial_capacity: Some(100_003),
            }),
            log: Some(LogConfig {
                debug: Some(true),
                quiet: Some(false),
            }),
        };

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: LanesConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn reject_unknown_fields() {
        let toml = r#"
            [cache]
            initial_capacity = 10
            eviction = "lru"
        "#;

        let result: Result<LanesConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
