//! Core error types for barcode-scout.
//!
//! Scraping and browser faults live in their own crates; this module only
//! covers what the shared types and the configuration loader can get wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the shared types.
#[derive(Error, Debug)]
pub enum ScoutError {
    /// Configuration could not be loaded or is unusable
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A lookup key was rejected before any scraping
    #[error("invalid barcode {value:?}: {reason}")]
    InvalidBarcode {
        /// The value as submitted
        value: String,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No home directory to derive the config path from
    #[error("could not determine config directory")]
    NoConfigDir,

    /// An explicitly named config file is missing
    #[error("config file not found at {}", path.display())]
    NotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// The config file exists but could not be read or written
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`AppConfig`](crate::AppConfig)
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Underlying TOML error
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value that parses but cannot work at runtime
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Dotted field name, e.g. `scraper.max_workers`
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using `ScoutError`.
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
