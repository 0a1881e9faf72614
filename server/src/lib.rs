//! barcode-scout HTTP API.
//!
//! Exposes barcode resolution over JSON. The listener comes up before the
//! browser does; [`AppState::initialize`] fills in the scraper in the
//! background and the barcode endpoint answers 503 until it has.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
