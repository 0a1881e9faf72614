//! Scrape orchestrator for resolving barcodes.
//!
//! This module provides the `ScrapeOrchestrator`, which owns the browser
//! sessions and the result cache. Each resolution borrows one session from
//! the pool, runs the catalog driver under the retry policy and caches the
//! record on success. Failures are returned to the caller but never cached,
//! so the next request for the same barcode scrapes again.

use crate::cache::ResultCache;
use crate::catalog::{CatalogDriver, CatalogOutcome};
use crate::error::{Result, ScanError};
use crate::pool::SessionPool;
use crate::retry::RetryPolicy;
use futures::stream::{self, StreamExt, TryStreamExt};
use scout_browser::{BrowserActions, BrowserEngine};
use scout_core::{AppConfig, Barcode, ProductRecord, Resolution, NO_RESULTS_MESSAGE};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// A browser session as stored in the pool.
pub type Session = Box<dyn BrowserActions>;

/// Resolves barcodes to product records.
pub struct ScrapeOrchestrator {
    /// Catalog driver (owns the registry driver)
    catalog: CatalogDriver,
    /// Per-barcode retry policy
    retry: RetryPolicy,
    /// Successful resolutions
    cache: ResultCache,
    /// One session per worker
    pool: SessionPool<Session>,
}

impl ScrapeOrchestrator {
    /// Create an orchestrator over already-open sessions.
    ///
    /// The number of sessions is the number of barcodes resolved at once.
    /// With no sessions every `resolve` fails with [`ScanError::PoolClosed`].
    #[must_use]
    pub fn new(config: &AppConfig, sessions: Vec<Session>) -> Self {
        Self {
            catalog: CatalogDriver::new(&config.sites, &config.scraper),
            retry: RetryPolicy::from_config(&config.scraper),
            cache: ResultCache::new(),
            pool: SessionPool::new(sessions),
        }
    }

    /// Open `scraper.max_workers` sessions on `engine` and build an
    /// orchestrator over them.
    pub async fn launch(config: &AppConfig, engine: &BrowserEngine) -> Result<Self> {
        let workers = config.scraper.max_workers.max(1);
        let mut sessions: Vec<Session> = Vec::with_capacity(workers);

        for _ in 0..workers {
            sessions.push(Box::new(engine.open_session().await?));
        }

        info!("Scrape orchestrator ready with {} browser sessions", workers);
        Ok(Self::new(config, sessions))
    }

    /// Number of barcodes that can be resolved concurrently.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.pool.size()
    }

    /// Cached record for `barcode`, if it has been resolved before.
    #[must_use]
    pub fn cached(&self, barcode: &str) -> Option<Arc<ProductRecord>> {
        self.cache.get(barcode)
    }

    /// Number of cached records.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Resolve one barcode.
    ///
    /// Scrape failures come back as [`Resolution::Failed`]. `Err` is reserved
    /// for faults of the scraper itself: a closed pool or a dead browser.
    pub async fn resolve(&self, barcode: &str) -> Result<Resolution> {
        let start = Instant::now();

        let barcode = match Barcode::new(barcode) {
            Ok(barcode) => barcode,
            Err(e) => {
                warn!("Rejected barcode {:?}: {}", barcode, e);
                return Ok(Resolution::failed(barcode, format!("오류 발생: {e}")));
            }
        };

        if let Some(record) = self.cache.get(barcode.as_str()) {
            info!("Barcode {} served from cache", barcode);
            return Ok(Resolution::Found(record));
        }

        let pooled = self.pool.acquire().await?;

        // another resolution may have filled the entry while we waited
        if let Some(record) = self.cache.get(barcode.as_str()) {
            debug!("Barcode {} cached while waiting for a session", barcode);
            return Ok(Resolution::Found(record));
        }

        let session: &dyn BrowserActions = &**pooled;
        let catalog = &self.catalog;
        let target = &barcode;

        let outcome = self
            .retry
            .run_if(
                &format!("barcode {barcode}"),
                |e: &ScanError| !e.is_fatal(),
                move || catalog.search(session, target),
            )
            .await;

        let resolution = match outcome {
            Ok(CatalogOutcome::Found(record)) => {
                let record = self.cache.insert(barcode.as_str(), record);
                info!(
                    "Barcode {} resolved in {:.2}s",
                    barcode,
                    start.elapsed().as_secs_f64()
                );
                Resolution::Found(record)
            }
            Ok(CatalogOutcome::NoResults) => {
                Resolution::failed(barcode.as_str(), NO_RESULTS_MESSAGE)
            }
            Err(e) if e.is_fatal() => {
                error!("Scraper fault while resolving {}: {}", barcode, e);
                return Err(e);
            }
            Err(e) => {
                error!("Barcode {} failed: {}", barcode, e);
                Resolution::failed(barcode.as_str(), format!("오류 발생: {e}"))
            }
        };

        Ok(resolution)
    }

    /// Resolve many barcodes, at most one per session at a time.
    ///
    /// Results come back in input order.
    pub async fn resolve_batch<I, B>(&self, barcodes: I) -> Result<Vec<Resolution>>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<str>,
    {
        let concurrency = self.pool.size().max(1);

        stream::iter(barcodes)
            .map(|barcode| async move { self.resolve(barcode.as_ref()).await })
            .buffered(concurrency)
            .try_collect()
            .await
    }

    /// Wait for in-flight resolutions, then close every session.
    pub async fn shutdown(&self) {
        let sessions = self.pool.drain().await;
        debug!("Closing {} browser sessions", sessions.len());

        for session in sessions {
            if let Err(e) = session.close().await {
                warn!("Failed to close browser session: {}", e);
            }
        }
    }
}
