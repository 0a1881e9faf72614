//! Scout Scanner - barcode resolution.
//!
//! This crate turns a barcode into a product record by driving the catalog
//! site, then the registry site for every report number found on the
//! product page. It adds bounded retry, a process-lifetime cache of
//! successful lookups and a pool of browser sessions so several barcodes can
//! be resolved at once without sharing a page.
//!
//! # Features
//!
//! - Linear-backoff retry around each barcode and each report number
//! - Report number extraction with factory labels kept
//! - Cache of successes only; failures are always retried on the next request
//! - Order-preserving batch resolution bounded by the number of sessions
//!
//! # Example
//!
//! ```rust,ignore
//! use scout_browser::BrowserEngine;
//! use scout_core::AppConfig;
//! use scout_scanner::ScrapeOrchestrator;
//!
//! let config = AppConfig::load_with_env()?;
//! let engine = BrowserEngine::launch(&config.browser).await?;
//! let orchestrator = ScrapeOrchestrator::launch(&config, &engine).await?;
//!
//! let results = orchestrator
//!     .resolve_batch(["8801234567890", "8809876543210"])
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod cache;
pub mod catalog;
#[allow(missing_docs)]
pub mod error;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod pool;
#[allow(missing_docs)]
pub mod registry;
#[allow(missing_docs)]
pub mod report_number;
pub mod retry;

// Re-export commonly used types
pub use cache::ResultCache;
pub use catalog::{CatalogDriver, CatalogOutcome};
pub use error::{Result, ScanError};
pub use orchestrator::{ScrapeOrchestrator, Session};
pub use pool::{PooledSession, SessionPool};
pub use registry::{RegistryDriver, RegistryOutcome};
pub use report_number::extract_report_numbers;
pub use retry::RetryPolicy;
