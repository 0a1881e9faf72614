//! Driver for the product catalog.
//!
//! Searches a barcode, reads the first listing, opens its detail view and
//! hands any report numbers printed there to the registry driver.

use crate::error::{Result, ScanError};
use crate::registry::RegistryDriver;
use crate::report_number::extract_report_numbers;
use scout_browser::{BrowserActions, Waiter};
use scout_core::{
    Barcode, CatalogSite, Locator, ProductRecord, ScraperConfig, Site, SitesConfig, NOT_AVAILABLE,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of a catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOutcome {
    /// A listing was found and fully resolved
    Found(ProductRecord),
    /// The search came back empty
    NoResults,
}

/// Drives the catalog search and the follow-up registry lookups.
#[derive(Debug, Clone)]
pub struct CatalogDriver {
    site: CatalogSite,
    registry: RegistryDriver,
    waiter: Waiter,
    settle: Duration,
}

impl CatalogDriver {
    /// Create a driver for both sites using the scraper timings.
    #[must_use]
    pub fn new(sites: &SitesConfig, config: &ScraperConfig) -> Self {
        Self {
            site: sites.catalog.clone(),
            registry: RegistryDriver::new(sites.registry.clone(), config),
            waiter: Waiter::from_config(config),
            settle: config.settle_delay(),
        }
    }

    /// Search `barcode` and build its product record.
    ///
    /// A missing search box is an error (worth retrying); an empty result
    /// list is [`CatalogOutcome::NoResults`].
    pub async fn search(
        &self,
        session: &dyn BrowserActions,
        barcode: &Barcode,
    ) -> Result<CatalogOutcome> {
        let locators = &self.site.locators;
        info!("Searching catalog for barcode {}", barcode);

        session.navigate(&self.site.url).await?;

        let search_box = self
            .waiter
            .locate(session, &locators.search_box, None)
            .await?
            .ok_or(ScanError::SearchBoxNotFound { site: Site::Catalog })?;
        search_box.clear_and_type(barcode.as_str()).await?;

        // The form also submits on enter, so a missing or stubborn button is fine
        match self
            .waiter
            .locate(session, &locators.search_button, None)
            .await?
        {
            Some(button) => {
                if let Err(e) = button.click().await {
                    warn!("Could not click catalog search button: {}", e);
                }
            }
            None => debug!("Catalog search button not found"),
        }

        tokio::time::sleep(self.settle).await;

        let Some(product_link) = self
            .waiter
            .locate(session, &locators.product_link, None)
            .await?
        else {
            info!("No catalog results for barcode {}", barcode);
            return Ok(CatalogOutcome::NoResults);
        };

        let name = self.text_or_default(session, &locators.product_name).await?;
        let category = self.text_or_default(session, &locators.manufacturer).await?;
        let image_url = match self.waiter.locate(session, &locators.image, None).await? {
            Some(image) => image.attribute("src").await?,
            None => None,
        };

        product_link.click().await?;
        tokio::time::sleep(self.settle).await;

        let (report_number, expiry) = match self
            .waiter
            .locate(session, &locators.report_number, None)
            .await?
        {
            Some(element) => {
                let text = element.text().await?;
                let numbers = extract_report_numbers(&text);
                let expiry = self.registry.lookup(session, numbers).await?.into_expiry();
                (text, expiry)
            }
            None => {
                debug!("No report number on the detail view of {}", barcode);
                (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string())
            }
        };

        Ok(CatalogOutcome::Found(ProductRecord {
            report_number,
            name,
            category,
            image_url,
            barcode: barcode.to_string(),
            expiry,
        }))
    }

    async fn text_or_default(&self, session: &dyn BrowserActions, locator: &Locator) -> Result<String> {
        Ok(match self.waiter.locate(session, locator, None).await? {
            Some(element) => element.text().await?,
            None => NOT_AVAILABLE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_browser::mock::{MockElement, MockPage, MockSite};
    use scout_core::{CatalogLocators, RegistryLocators, RegistrySite};
    use tokio::time::Instant;

    const CATALOG: &str = "https://catalog.example.com/search";
    const DETAIL: &str = "https://catalog.example.com/detail/1";
    const REGISTRY: &str = "https://registry.example.com/search";
    const BARCODE: &str = "8801234567890";

    fn driver() -> CatalogDriver {
        let sites = SitesConfig {
            catalog: CatalogSite {
                url: CATALOG.to_string(),
                locators: CatalogLocators::default(),
            },
            registry: RegistrySite {
                url: REGISTRY.to_string(),
                locators: RegistryLocators::default(),
            },
        };
        CatalogDriver::new(&sites, &ScraperConfig::default())
    }

    fn catalog_page(results: MockPage) -> MockPage {
        let locators = CatalogLocators::default();
        MockPage::new()
            .element(locators.search_box, MockElement::input())
            .element(locators.search_button, MockElement::submit())
            .on_search(BARCODE, results)
    }

    fn listing() -> MockPage {
        let locators = CatalogLocators::default();
        MockPage::new()
            .element(locators.product_link, MockElement::link("  서울우유 1L ", DETAIL))
            .element(locators.manufacturer, MockElement::text("서울우유협동조합"))
            .element(
                locators.image,
                MockElement::text("").attr("src", "https://img.example.com/1.png"),
            )
    }

    fn detail(report_text: &str) -> MockPage {
        MockPage::new().element(CatalogLocators::default().report_number, MockElement::text(report_text))
    }

    fn registry_page() -> MockPage {
        let locators = RegistryLocators::default();
        MockPage::new()
            .element(locators.search_box, MockElement::input())
            .element(locators.search_button, MockElement::submit())
            .on_search(
                "19780123456789",
                MockPage::new().element(locators.expiry_info, MockElement::text("제조일로부터 10일")),
            )
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_record() {
        let site = MockSite::builder()
            .page(CATALOG, catalog_page(listing()))
            .page(DETAIL, detail("19780123456789"))
            .page(REGISTRY, registry_page())
            .build();
        let session = site.session();
        let barcode = Barcode::new(BARCODE).unwrap();

        let outcome = driver().search(&session, &barcode).await.unwrap();

        assert_eq!(
            outcome,
            CatalogOutcome::Found(ProductRecord {
                report_number: "19780123456789".to_string(),
                name: "서울우유 1L".to_string(),
                category: "서울우유협동조합".to_string(),
                image_url: Some("https://img.example.com/1.png".to_string()),
                barcode: BARCODE.to_string(),
                expiry: "제조일로부터 10일".to_string(),
            })
        );
        assert_eq!(site.navigations(), vec![CATALOG.to_string(), REGISTRY.to_string()]);
        assert_eq!(
            site.typed(),
            vec![BARCODE.to_string(), "19780123456789".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_results_is_not_an_error() {
        let site = MockSite::builder()
            .page(CATALOG, catalog_page(listing()))
            .build();
        let session = site.session();
        let barcode = Barcode::new("0000000000000").unwrap();

        let outcome = driver().search(&session, &barcode).await.unwrap();

        assert_eq!(outcome, CatalogOutcome::NoResults);
        assert_eq!(site.navigations(), vec![CATALOG.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_search_box() {
        let site = MockSite::builder().page(CATALOG, MockPage::new()).build();
        let session = site.session();
        let barcode = Barcode::new(BARCODE).unwrap();

        let err = driver().search(&session, &barcode).await.unwrap_err();
        assert!(matches!(
            err,
            ScanError::SearchBoxNotFound { site: Site::Catalog }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_fields_fall_back() {
        let locators = CatalogLocators::default();
        let sparse = MockPage::new().element(locators.product_link, MockElement::link("우유", DETAIL));
        let site = MockSite::builder()
            .page(CATALOG, catalog_page(sparse))
            .page(DETAIL, MockPage::new())
            .build();
        let session = site.session();
        let barcode = Barcode::new(BARCODE).unwrap();

        let CatalogOutcome::Found(record) = driver().search(&session, &barcode).await.unwrap()
        else {
            panic!("expected a record");
        };

        assert_eq!(record.name, "우유");
        assert_eq!(record.category, NOT_AVAILABLE);
        assert_eq!(record.image_url, None);
        assert_eq!(record.report_number, NOT_AVAILABLE);
        assert_eq!(record.expiry, NOT_AVAILABLE);
        // registry never visited
        assert_eq!(site.navigations(), vec![CATALOG.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_text_without_numbers() {
        let site = MockSite::builder()
            .page(CATALOG, catalog_page(listing()))
            .page(DETAIL, detail("해당없음"))
            .page(REGISTRY, registry_page())
            .build();
        let session = site.session();
        let barcode = Barcode::new(BARCODE).unwrap();

        let CatalogOutcome::Found(record) = driver().search(&session, &barcode).await.unwrap()
        else {
            panic!("expected a record");
        };

        assert_eq!(record.report_number, "해당없음");
        assert_eq!(record.expiry, NOT_AVAILABLE);
        assert_eq!(site.navigation_count(REGISTRY), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_delay_after_submit_and_click() {
        let site = MockSite::builder()
            .page(CATALOG, catalog_page(listing()))
            .page(DETAIL, detail("19780123456789"))
            .page(REGISTRY, registry_page())
            .build();
        let session = site.session();
        let barcode = Barcode::new(BARCODE).unwrap();

        let start = Instant::now();
        driver().search(&session, &barcode).await.unwrap();

        // two 2s settle delays plus the 3s overlay detection window
        assert!(start.elapsed() >= Duration::from_secs(7));
        assert!(start.elapsed() < Duration::from_secs(8));
    }
}
