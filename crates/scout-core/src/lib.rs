//! Scout Core - Foundation crate for the barcode-scout service.
//!
//! This crate provides shared types, error handling, configuration management,
//! and the static locator table that all other scout crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`sites`] - Locator table for the catalog and registry sites
//! - [`types`] - Shared newtypes and records (`Barcode`, `ReportNumber`, `ProductRecord`, `Resolution`)
//!
//! # Example
//!
//! ```rust
//! use scout_core::{AppConfig, Barcode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! config.validate()?;
//!
//! let barcode = Barcode::new("8801234567890")?;
//! assert_eq!(barcode.as_str(), "8801234567890");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod sites;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, LoggingConfig, ScraperConfig, ServerConfig};
pub use error::{ConfigError, ConfigResult, Result, ScoutError};
pub use sites::{
    CatalogLocators, CatalogSite, Locator, RegistryLocators, RegistrySite, Site, SitesConfig,
};
pub use types::{
    Barcode, ProductRecord, ReportNumber, Resolution, NOT_AVAILABLE, NO_RESULTS_MESSAGE,
};
