//! Driver for the food safety registry.
//!
//! Each report number gets a fresh search on the registry; results are
//! merged into one expiry string. A report number that keeps failing only
//! costs its own segment.

use crate::error::{Result, ScanError};
use crate::retry::RetryPolicy;
use scout_browser::{BrowserActions, Waiter};
use scout_core::{RegistrySite, ReportNumber, ScraperConfig, Site, NOT_AVAILABLE};
use std::time::Duration;
use tracing::{debug, error, info};

/// Separator between per-report-number segments.
pub const SEGMENT_SEPARATOR: &str = " | ";

/// Message when no report number produced anything.
pub const ALL_LOOKUPS_FAILED: &str = "모든 품목보고번호 조회 실패";

/// Result of looking up a set of report numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryOutcome {
    /// At least one report number produced text
    Resolved { expiry: String },
    /// Nothing usable came back
    Unresolved { message: String },
}

impl RegistryOutcome {
    /// The merged expiry text, or the not-available sentinel.
    #[must_use]
    pub fn into_expiry(self) -> String {
        match self {
            Self::Resolved { expiry } => expiry,
            Self::Unresolved { .. } => NOT_AVAILABLE.to_string(),
        }
    }
}

/// Looks up expiry information by report number.
#[derive(Debug, Clone)]
pub struct RegistryDriver {
    site: RegistrySite,
    waiter: Waiter,
    retry: RetryPolicy,
    overlay_detect: Duration,
    overlay_clear: Duration,
}

impl RegistryDriver {
    /// Create a driver for `site` using the scraper timings.
    #[must_use]
    pub fn new(site: RegistrySite, config: &ScraperConfig) -> Self {
        Self {
            site,
            waiter: Waiter::from_config(config),
            retry: RetryPolicy::from_config(config),
            overlay_detect: config.overlay_detect_timeout(),
            overlay_clear: config.overlay_clear_timeout(),
        }
    }

    /// Look up each report number in turn on `session`.
    ///
    /// Pass a single number with `std::iter::once`. Each number is retried on
    /// its own; one that still fails contributes `조회 실패 (<error>)`
    /// instead of aborting the rest. Only a fatal error (dead session) is
    /// returned as `Err`.
    pub async fn lookup<I>(
        &self,
        session: &dyn BrowserActions,
        report_numbers: I,
    ) -> Result<RegistryOutcome>
    where
        I: IntoIterator<Item = ReportNumber>,
    {
        let mut segments = Vec::new();

        for report_number in report_numbers {
            let label = format!("report number {report_number}");
            let report_number = &report_number;
            let segment = match self
                .retry
                .run_if(
                    &label,
                    |e: &ScanError| !e.is_fatal(),
                    move || self.lookup_one(session, report_number),
                )
                .await
            {
                Ok(text) => text,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!("Registry lookup for {} failed: {}", report_number, e);
                    format!("조회 실패 ({e})")
                }
            };
            segments.push(segment);
        }

        segments.retain(|segment| !segment.is_empty());
        if segments.is_empty() {
            return Ok(RegistryOutcome::Unresolved {
                message: ALL_LOOKUPS_FAILED.to_string(),
            });
        }

        Ok(RegistryOutcome::Resolved {
            expiry: segments.join(SEGMENT_SEPARATOR),
        })
    }

    async fn lookup_one(
        &self,
        session: &dyn BrowserActions,
        report_number: &ReportNumber,
    ) -> Result<String> {
        let locators = &self.site.locators;
        info!("Looking up report number {}", report_number);

        session.navigate(&self.site.url).await?;

        let search_box = self
            .waiter
            .locate(session, &locators.search_box, None)
            .await?
            .ok_or(ScanError::SearchBoxNotFound {
                site: Site::Registry,
            })?;
        search_box.clear_and_type(report_number.number()).await?;

        if let Some(button) = self
            .waiter
            .locate(session, &locators.search_button, None)
            .await?
        {
            button.click().await?;
        }

        self.wait_for_overlay(session).await?;

        let text = match self
            .waiter
            .locate(session, &locators.expiry_info, None)
            .await?
        {
            Some(element) => element.text().await?,
            None => NOT_AVAILABLE.to_string(),
        };

        Ok(match report_number.label() {
            Some(label) => format!("{label}: {text}"),
            None => text,
        })
    }

    /// If the loading overlay shows up, give it time to go away.
    async fn wait_for_overlay(&self, session: &dyn BrowserActions) -> Result<()> {
        let overlay = &self.site.locators.loading;

        if self
            .waiter
            .locate(session, overlay, Some(self.overlay_detect))
            .await?
            .is_none()
        {
            debug!("No loading overlay detected");
            return Ok(());
        }

        if !self
            .waiter
            .wait_until_hidden(session, overlay, self.overlay_clear)
            .await?
        {
            debug!("Loading overlay still visible after {:?}", self.overlay_clear);
        }
        Ok(())
    }
}
