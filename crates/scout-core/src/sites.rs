//! Locator table for the two external sites.
//!
//! Maps the semantic fields the site drivers care about ("search box",
//! "product name", ...) to element locators on each site. Pure data: the
//! browser crate decides how a [`Locator`] is resolved on a live page.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog site search page.
pub const CATALOG_URL: &str = "https://www.koreannet.or.kr/front/allproduct/prodSrchList.do";

/// Registry site search page.
pub const REGISTRY_URL: &str = "https://www.foodsafetykorea.go.kr/portal/specialinfo/searchInfoProduct.do?menu_grp=MENU_NEW04&menu_no=2815";

/// The two external data sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    /// Consumer product catalog, searched by barcode
    Catalog,
    /// Regulatory registry, searched by report number
    Registry,
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog => write!(f, "catalog"),
            Self::Registry => write!(f, "registry"),
        }
    }
}

/// How to find an element on a page.
///
/// Serialized as a one-key table, e.g. `{ id = "searchText" }` or
/// `{ xpath = "//*[@id=\"srchBtn\"]" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locator {
    /// Match by element id
    #[serde(rename = "id")]
    Id(String),
    /// Match by a single class name
    #[serde(rename = "class")]
    Class(String),
    /// Match by an XPath expression
    #[serde(rename = "xpath")]
    XPath(String),
}

impl Locator {
    /// Locator matching an element id.
    pub fn id(value: impl Into<String>) -> Self {
        Self::Id(value.into())
    }

    /// Locator matching a class name.
    pub fn class(value: impl Into<String>) -> Self {
        Self::Class(value.into())
    }

    /// Locator matching an XPath expression.
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::XPath(value.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(v) => write!(f, "id={v}"),
            Self::Class(v) => write!(f, "class={v}"),
            Self::XPath(v) => write!(f, "xpath={v}"),
        }
    }
}

/// Both target sites.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SitesConfig {
    /// Product catalog site
    pub catalog: CatalogSite,
    /// Regulatory registry site
    pub registry: RegistrySite,
}

/// Catalog site URL and locators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSite {
    /// Search page URL
    pub url: String,
    /// Element locators
    pub locators: CatalogLocators,
}

impl Default for CatalogSite {
    fn default() -> Self {
        Self {
            url: CATALOG_URL.to_string(),
            locators: CatalogLocators::default(),
        }
    }
}

/// Catalog site element locators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogLocators {
    /// Barcode search input
    pub search_box: Locator,
    /// Search submit control
    pub search_button: Locator,
    /// First result's link into the detail view
    pub product_link: Locator,
    /// First result's product name
    pub product_name: Locator,
    /// First result's manufacturer / category line
    pub manufacturer: Locator,
    /// First result's thumbnail
    pub image: Locator,
    /// Report number text block on the detail view
    pub report_number: Locator,
}

impl Default for CatalogLocators {
    fn default() -> Self {
        const RESULT: &str = r#"//*[@id="listForm"]/div/div/ul/li/div"#;
        Self {
            search_box: Locator::id("searchText"),
            search_button: Locator::class("submit"),
            product_link: Locator::xpath(format!("{RESULT}/div[2]/div/a/div[2]")),
            product_name: Locator::xpath(format!("{RESULT}/div[2]/div/a/div[2]")),
            manufacturer: Locator::xpath(format!("{RESULT}/div[2]/div/div")),
            image: Locator::xpath(format!("{RESULT}/div[1]/a/img")),
            report_number: Locator::xpath(
                "/html/body/div[2]/form/div/div/div[3]/div[2]/div[4]/div[4]/div[2]",
            ),
        }
    }
}

/// Registry site URL and locators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySite {
    /// Search page URL
    pub url: String,
    /// Element locators
    pub locators: RegistryLocators,
}

impl Default for RegistrySite {
    fn default() -> Self {
        Self {
            url: REGISTRY_URL.to_string(),
            locators: RegistryLocators::default(),
        }
    }
}

/// Registry site element locators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryLocators {
    /// Report number search input
    pub search_box: Locator,
    /// Search submit control
    pub search_button: Locator,
    /// Loading overlay shown while results load
    pub loading: Locator,
    /// Expiry cell of the first result row
    pub expiry_info: Locator,
}

impl Default for RegistryLocators {
    fn default() -> Self {
        Self {
            search_box: Locator::xpath(r#"//*[@id="prdlst_report_no1"]"#),
            search_button: Locator::xpath(r#"//*[@id="srchBtn"]"#),
            loading: Locator::xpath("/html/body/div[1]"),
            expiry_info: Locator::xpath(r#"//*[@id="tbody"]/tr/td[5]/span[2]"#),
        }
    }
}
