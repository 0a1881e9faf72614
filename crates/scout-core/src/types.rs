//! Shared types used across the barcode-scout service.
//!
//! This module defines the lookup key, the report-number identifier, the
//! assembled product record and the per-barcode resolution result.

use crate::error::ScoutError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Sentinel text for a field whose element was not on the page.
pub const NOT_AVAILABLE: &str = "정보 없음";

/// Message for a catalog search that matched no product.
pub const NO_RESULTS_MESSAGE: &str = "검색 결과가 없습니다.";

/// Newtype for barcodes.
///
/// Barcodes are opaque: the value is kept verbatim (including any
/// parenthetical suffix) and used as-is for the cache key and the catalog
/// search. Only empty or whitespace-only values are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Barcode(String);

impl Barcode {
    /// Create a new `Barcode` from a string.
    ///
    /// # Errors
    /// Returns error if the value is empty or whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, ScoutError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ScoutError::InvalidBarcode {
                value,
                reason: "must not be empty",
            });
        }
        Ok(Self(value))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Barcode {
    type Error = ScoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Barcode> for String {
    fn from(barcode: Barcode) -> Self {
        barcode.0
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A regulatory report number, optionally tagged with the factory or
/// source label printed next to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportNumber {
    number: String,
    label: Option<String>,
}

impl ReportNumber {
    /// Report number without a label.
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            label: None,
        }
    }

    /// Report number carrying a label. Blank labels are dropped.
    pub fn labelled(number: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        let label = label.trim();
        Self {
            number: number.into(),
            label: (!label.is_empty()).then(|| label.to_string()),
        }
    }

    /// The digits typed into the registry search.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// The label, if one was printed.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl fmt::Display for ReportNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}({label})", self.number),
            None => write!(f, "{}", self.number),
        }
    }
}

/// Product metadata and expiry information for one barcode.
///
/// Field names on the wire follow the API contract; English aliases are
/// accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Raw report number text from the catalog detail view
    #[serde(rename = "품목보고번호", alias = "report_number")]
    pub report_number: String,
    /// Product name
    #[serde(rename = "제품명", alias = "name")]
    pub name: String,
    /// Manufacturer / category line
    #[serde(rename = "카테고리", alias = "category")]
    pub category: String,
    /// Thumbnail URL
    #[serde(rename = "이미지URL", alias = "image_url")]
    pub image_url: Option<String>,
    /// The barcode that was searched
    #[serde(rename = "바코드", alias = "barcode")]
    pub barcode: String,
    /// Expiry text, one segment per report number
    #[serde(rename = "소비기한", alias = "expiry")]
    pub expiry: String,
}

/// Outcome of resolving one barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The product was found. Shared so cache hits hand out the same record.
    Found(Arc<ProductRecord>),
    /// No product; carries the requested barcode and a human-readable reason.
    Failed {
        /// The barcode as requested
        barcode: String,
        /// Why resolution failed
        message: String,
    },
}

impl Resolution {
    /// Build a failure result.
    pub fn failed(barcode: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            barcode: barcode.into(),
            message: message.into(),
        }
    }

    /// The barcode this result is for.
    #[must_use]
    pub fn barcode(&self) -> &str {
        match self {
            Self::Found(record) => &record.barcode,
            Self::Failed { barcode, .. } => barcode,
        }
    }

    /// Check if the barcode resolved to a product.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The product record, on success.
    #[must_use]
    pub fn record(&self) -> Option<&Arc<ProductRecord>> {
        match self {
            Self::Found(record) => Some(record),
            Self::Failed { .. } => None,
        }
    }

    /// The failure message, on failure.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Found(_) => None,
            Self::Failed { message, .. } => Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ProductRecord {
        ProductRecord {
            report_number: "19880123000123".to_string(),
            name: "Sample Noodles".to_string(),
            category: "Sample Foods Co.".to_string(),
            image_url: None,
            barcode: "8801234567890".to_string(),
            expiry: "제조일로부터 6개월".to_string(),
        }
    }

    #[test]
    fn test_barcode_valid() {
        assert!(Barcode::new("8801234567890").is_ok());
        assert!(Barcode::new("012345(FactoryA)").is_ok());
    }

    #[test]
    fn test_barcode_kept_verbatim() {
        let barcode = Barcode::new(" 0123 ").expect("valid barcode");
        assert_eq!(barcode.as_str(), " 0123 ");
    }

    #[test]
    fn test_barcode_invalid() {
        assert!(Barcode::new("").is_err());
        assert!(Barcode::new("   ").is_err());
    }

    #[test]
    fn test_barcode_serde_rejects_empty() {
        let result: Result<Barcode, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_report_number_display() {
        assert_eq!(ReportNumber::new("1234567890").to_string(), "1234567890");
        assert_eq!(
            ReportNumber::labelled("1234567890", "FactoryA").to_string(),
            "1234567890(FactoryA)"
        );
    }

    #[test]
    fn test_report_number_blank_label_dropped() {
        let number = ReportNumber::labelled("1234567890", "  ");
        assert_eq!(number.label(), None);
    }

    #[test]
    fn test_product_record_wire_names() {
        let json = serde_json::to_value(sample_record()).expect("serialize record");
        assert_eq!(json["품목보고번호"], "19880123000123");
        assert_eq!(json["제품명"], "Sample Noodles");
        assert_eq!(json["카테고리"], "Sample Foods Co.");
        assert!(json["이미지URL"].is_null());
        assert_eq!(json["바코드"], "8801234567890");
        assert_eq!(json["소비기한"], "제조일로부터 6개월");
    }

    #[test]
    fn test_product_record_english_aliases() {
        let json = r#"{
            "report_number": "1",
            "name": "n",
            "category": "c",
            "image_url": "https://example.com/a.png",
            "barcode": "b",
            "expiry": "e"
        }"#;
        let record: ProductRecord = serde_json::from_str(json).expect("parse record");
        assert_eq!(record.image_url.as_deref(), Some("https://example.com/a.png"));
    }

    #[test]
    fn test_resolution_accessors() {
        let found = Resolution::Found(Arc::new(sample_record()));
        assert!(found.is_success());
        assert_eq!(found.barcode(), "8801234567890");
        assert!(found.message().is_none());

        let failed = Resolution::failed("A", NO_RESULTS_MESSAGE);
        assert!(!failed.is_success());
        assert_eq!(failed.barcode(), "A");
        assert_eq!(failed.message(), Some(NO_RESULTS_MESSAGE));
        assert!(failed.record().is_none());
    }
}
