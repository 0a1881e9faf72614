use anyhow::Context;
use scout_core::AppConfig;
use scout_server::{create_router, telemetry, AppState};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    let _log_guard = telemetry::init_tracing(&config.logging)?;

    info!("Starting barcode-scout v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::new();
    let app = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!("failed to bind {}:{}", config.server.host, config.server.port)
        })?;
    info!("Listening on http://{}", listener.local_addr()?);

    let init = {
        let state = state.clone();
        let config = config.clone();
        tokio::spawn(async move {
            if let Err(e) = state.initialize(&config).await {
                error!("Failed to initialize scraper: {:#}", e);
            }
        })
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    init.abort();
    state.shutdown().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
