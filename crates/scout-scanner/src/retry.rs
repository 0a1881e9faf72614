//! Bounded retry with linear backoff.
//!
//! The same policy drives async operations ([`RetryPolicy::run`]) and
//! blocking ones ([`RetryPolicy::run_blocking`]); only the way the backoff
//! is slept differs.

use scout_core::ScraperConfig;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Maximum attempts and base delay for retried operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// Create a policy. `max_retries` counts total attempts and is at least 1.
    #[must_use]
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            delay,
        }
    }

    /// Policy from the scraper settings.
    #[must_use]
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(config.max_retries, config.retry_delay())
    }

    /// Total attempts before giving up.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay after the failed attempt with zero-based index `attempt`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.delay.saturating_mul(attempt.saturating_add(1))
    }

    /// Decide what to do after a failure: `Some(delay)` to retry after
    /// sleeping, `None` when attempts are exhausted or the error is final.
    fn after_failure(
        &self,
        label: &str,
        attempt: u32,
        err: &dyn Display,
        retryable: bool,
    ) -> Option<Duration> {
        if !retryable {
            error!("{} failed with a non-retryable error: {}", label, err);
            return None;
        }
        if attempt + 1 >= self.max_retries {
            error!(
                "{} failed after {} attempts: {}",
                label, self.max_retries, err
            );
            return None;
        }

        let delay = self.backoff(attempt);
        warn!(
            "{} failed (attempt {}/{}): {}; retrying in {:?}",
            label,
            attempt + 1,
            self.max_retries,
            err,
            delay
        );
        Some(delay)
    }

    /// Run an async operation until it succeeds or attempts run out.
    ///
    /// The error from the last attempt is returned as is.
    pub async fn run<T, E, F, Fut>(&self, label: &str, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run_if(label, |_| true, operation).await
    }

    /// Like [`RetryPolicy::run`], but an error for which `retryable`
    /// returns false is returned at once.
    pub async fn run_if<T, E, F, Fut, P>(
        &self,
        label: &str,
        retryable: P,
        mut operation: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => match self.after_failure(label, attempt, &e, retryable(&e)) {
                    Some(delay) => tokio::time::sleep(delay).await,
                    None => return Err(e),
                },
            }
            attempt += 1;
        }
    }

    /// Run a blocking operation until it succeeds or attempts run out.
    ///
    /// Sleeps the calling thread between attempts; call it from
    /// `spawn_blocking` or a plain thread, never from an async task.
    pub fn run_blocking<T, E, F>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: Display,
    {
        let mut attempt = 0;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(e) => match self.after_failure(label, attempt, &e, true) {
                    Some(delay) => std::thread::sleep(delay),
                    None => return Err(e),
                },
            }
            attempt += 1;
        }
    }
}
