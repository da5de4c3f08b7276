//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Explicit settings made by the host (not handled here)
//!
//! # Config Locations
//!
//! Searched in order, first hit wins:
//! 1. `$COMMIT_LANES_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/commit-lanes/config.toml`
//! 3. `~/.commit-lanes/config.toml`
//!
//! A missing file is not an error; defaults are used.
//!
//! # Example
//!
//! ```no_run
//! use commit_lanes::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("Initial capacity: {}", config.initial_capacity());
//! println!("Verbosity: {:?}", config.verbosity());
//! ```

pub mod schema;

pub use schema::{CacheConfig, LanesConfig, LogConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ui::output::Verbosity;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "COMMIT_LANES_CONFIG";

/// Rows reserved when nothing is configured.
pub const DEFAULT_INITIAL_CAPACITY: usize = 4096;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration with defaults applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: LanesConfig,
    /// Path the file was loaded from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::locate() {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: LanesConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Find the first existing config file.
    fn locate() -> Option<PathBuf> {
        // 1. Check $COMMIT_LANES_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/commit-lanes/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("commit-lanes/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.commit-lanes/config.toml
        dirs::home_dir()
            .map(|home| home.join(".commit-lanes/config.toml"))
            .filter(|path| path.exists())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Rows to reserve in the revision cache.
    ///
    /// Defaults to [`DEFAULT_INITIAL_CAPACITY`].
    pub fn initial_capacity(&self) -> usize {
        self.file
            .cache
            .as_ref()
            .and_then(|c| c.initial_capacity)
            .unwrap_or(DEFAULT_INITIAL_CAPACITY)
    }

    /// Diagnostic verbosity.
    ///
    /// Defaults to [`Verbosity::Normal`].
    pub fn verbosity(&self) -> Verbosity {
        let log = self.file.log.clone().unwrap_or_default();
        Verbosity::from_flags(log.quiet.unwrap_or(false), log.debug.unwrap_or(false))
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
