use scout_browser::BrowserError;
use scout_core::Site;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{site} search box not found")]
    SearchBoxNotFound { site: Site },

    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("session pool closed")]
    PoolClosed,
}

impl ScanError {
    /// Whether the failure is about the scraper itself rather than one
    /// barcode. These surface as server errors instead of per-item failures.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::PoolClosed | Self::Browser(BrowserError::SessionClosed)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
