//! Element polling.
//!
//! [`Waiter::locate`] polls a session until an element shows up or the
//! timeout runs out. Running out is a normal outcome and comes back as
//! `Ok(None)`; only session faults are errors.

use crate::actions::BrowserActions;
use crate::error::Result;
use scout_core::{Locator, ScraperConfig};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Polls a session for elements.
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    default_timeout: Duration,
    poll_interval: Duration,
}

impl Default for Waiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_millis(250))
    }
}

impl Waiter {
    /// Create a waiter with a default timeout and poll interval.
    #[must_use]
    pub fn new(default_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            default_timeout,
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    /// Waiter using the configured wait and poll interval.
    #[must_use]
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(config.wait_timeout(), config.poll_interval())
    }

    /// The timeout used when callers pass `None`.
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Wait for an element to be present.
    ///
    /// Returns `Ok(None)` if it has not appeared when `timeout` (or the
    /// default timeout) elapses.
    pub async fn locate<'a>(
        &self,
        session: &'a dyn BrowserActions,
        locator: &'a Locator,
        timeout: Option<Duration>,
    ) -> Result<Option<Element<'a>>> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let found = self
            .poll(timeout, || async { session.is_present(locator).await })
            .await?;

        if found {
            Ok(Some(Element { session, locator }))
        } else {
            debug!("{} not present after {:?}", locator, timeout);
            Ok(None)
        }
    }

    /// Wait for an element to be absent or hidden.
    ///
    /// Returns `Ok(false)` if it is still visible when `timeout` elapses.
    pub async fn wait_until_hidden(
        &self,
        session: &dyn BrowserActions,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<bool> {
        self.poll(timeout, || async {
            session.is_visible(locator).await.map(|visible| !visible)
        })
        .await
    }

    /// Evaluate `check` until it yields `true` or the deadline passes.
    ///
    /// The check always runs at least once. Transient errors count as "not
    /// yet".
    async fn poll<F, Fut>(&self, timeout: Duration, mut check: F) -> Result<bool>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<bool>>,
    {
        let deadline = Instant::now() + timeout;

        loop {
            match check().await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) if e.is_transient() => debug!("Ignoring transient error while polling: {}", e),
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}

/// An element known to have been present when it was located.
///
/// Operations re-resolve the locator, so an element that has since gone
/// away surfaces as an error from the session.
#[derive(Clone, Copy)]
pub struct Element<'a> {
    session: &'a dyn BrowserActions,
    locator: &'a Locator,
}

impl<'a> Element<'a> {
    /// The locator this element was found by.
    #[must_use]
    pub fn locator(&self) -> &'a Locator {
        self.locator
    }

    /// Rendered text, trimmed.
    pub async fn text(&self) -> Result<String> {
        Ok(self.session.text(self.locator).await?.trim().to_string())
    }

    /// Attribute or resolved property value.
    pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.session.attribute(self.locator, name).await
    }

    /// Click the element.
    pub async fn click(&self) -> Result<()> {
        self.session.click(self.locator).await
    }

    /// Clear the element's value and type into it.
    pub async fn clear_and_type(&self, value: &str) -> Result<()> {
        self.session.clear_and_type(self.locator, value).await
    }
}

impl std::fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("locator", self.locator)
            .finish_non_exhaustive()
    }
}
