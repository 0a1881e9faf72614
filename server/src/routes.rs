//! Router configuration for the API server.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check for container orchestration
        .route("/health", get(handlers::health))
        .route("/api/v1/barcode", post(handlers::resolve_barcodes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
