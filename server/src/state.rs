//! Application state management.

use scout_browser::BrowserEngine;
use scout_core::AppConfig;
use scout_scanner::ScrapeOrchestrator;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// State shared across all request handlers.
///
/// The browser and orchestrator are filled in once, after the listener is
/// already up. Until then the scraper reports as not initialized.
#[derive(Clone, Default)]
pub struct AppState {
    /// Shared Chromium process; owns the page sessions
    engine: Arc<OnceCell<BrowserEngine>>,
    /// Resolves barcodes once the engine is up
    orchestrator: Arc<OnceCell<ScrapeOrchestrator>>,
}

impl AppState {
    /// Create state with nothing initialized yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state around an orchestrator that is already running.
    #[must_use]
    pub fn with_orchestrator(orchestrator: ScrapeOrchestrator) -> Self {
        Self {
            engine: Arc::default(),
            orchestrator: Arc::new(OnceCell::new_with(Some(orchestrator))),
        }
    }

    pub fn orchestrator(&self) -> Option<&ScrapeOrchestrator> {
        self.orchestrator.get()
    }

    pub fn is_ready(&self) -> bool {
        self.orchestrator.initialized()
    }

    /// Launch the browser and open one session per worker.
    pub async fn initialize(&self, config: &AppConfig) -> anyhow::Result<()> {
        let engine = self
            .engine
            .get_or_try_init(|| BrowserEngine::launch(&config.browser))
            .await?;

        self.orchestrator
            .get_or_try_init(|| ScrapeOrchestrator::launch(config, engine))
            .await?;

        info!("Scraper initialized");
        Ok(())
    }

    /// Close every session, then the browser.
    pub async fn shutdown(&self) {
        if let Some(orchestrator) = self.orchestrator.get() {
            orchestrator.shutdown().await;
        }

        if let Some(engine) = self.engine.get() {
            if let Err(e) = engine.shutdown().await {
                warn!("Failed to shut down browser: {}", e);
            }
        }
    }
}
