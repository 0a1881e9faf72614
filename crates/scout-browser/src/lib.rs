//! Browser automation for the catalog and registry sites.
//!
//! Provides headless Chromium sessions behind the [`BrowserActions`] trait,
//! and the [`Waiter`] that turns "element never showed up" into `None`
//! instead of an error.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod locator;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod wait;

pub use actions::BrowserActions;
pub use engine::{BrowserEngine, PageSession};
pub use error::{BrowserError, Result};
pub use wait::{Element, Waiter};
