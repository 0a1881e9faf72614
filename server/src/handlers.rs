//! HTTP request handlers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use scout_core::{ProductRecord, Resolution};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Body of a barcode lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarcodeRequest {
    pub barcodes: Vec<String>,
}

/// Per-barcode entry of a lookup response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeResponse {
    pub barcode: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_info: Option<ProductRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Resolution> for BarcodeResponse {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Found(record) => Self {
                barcode: record.barcode.clone(),
                success: true,
                product_info: Some(ProductRecord::clone(&record)),
                message: None,
            },
            Resolution::Failed { barcode, message } => Self {
                barcode,
                success: false,
                product_info: None,
                message: Some(message),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub scraper_status: String,
    pub version: String,
}

/// Resolve a batch of barcodes. Entries come back in request order.
pub async fn resolve_barcodes(
    State(state): State<AppState>,
    Json(request): Json<BarcodeRequest>,
) -> Result<Json<Vec<BarcodeResponse>>, ApiError> {
    let span = info_span!(
        "barcode_request",
        request_id = %Uuid::new_v4(),
        count = request.barcodes.len()
    );

    async move {
        if request.barcodes.is_empty() {
            return Err(ApiError::empty_barcode_list());
        }

        let orchestrator = state.orchestrator().ok_or_else(ApiError::scraper_not_ready)?;

        info!("Processing {} barcodes", request.barcodes.len());
        let start = Instant::now();

        let responses: Vec<BarcodeResponse> = orchestrator
            .resolve_batch(request.barcodes)
            .await?
            .into_iter()
            .map(BarcodeResponse::from)
            .collect();

        let succeeded = responses.iter().filter(|r| r.success).count();
        info!(
            "Completed: {} total, {} succeeded, {} failed in {:.2}s",
            responses.len(),
            succeeded,
            responses.len() - succeeded,
            start.elapsed().as_secs_f64()
        );

        Ok(Json(responses))
    }
    .instrument(span)
    .await
}

/// Liveness plus scraper readiness.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let scraper_status = if state.is_ready() {
        "ready"
    } else {
        "not_initialized"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        scraper_status: scraper_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
