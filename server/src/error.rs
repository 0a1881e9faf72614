//! Error responses for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use scout_scanner::ScanError;
use serde::Serialize;

/// Serializable API error.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// HTTP status sent with the body
    #[serde(skip)]
    pub status: StatusCode,
    /// Error code for client handling (e.g., "EMPTY_BARCODE_LIST")
    pub code: String,
    /// User-friendly error message
    pub message: String,
    /// Optional debugging context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attach debugging context.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// The request carried no barcodes.
    pub fn empty_barcode_list() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "EMPTY_BARCODE_LIST",
            "바코드 목록이 비어있습니다.",
        )
    }

    /// The browser and orchestrator are still starting (or failed to).
    pub fn scraper_not_ready() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "SCRAPER_NOT_READY",
            "Scraper is not initialized yet",
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

/// Scanner errors that reach the API are faults of the scraper itself.
impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        Self::internal(format!("서버 오류: {err}"))
            .with_details(serde_json::json!({ "fatal": err.is_fatal() }))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
