use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use glucose_vision::{router, AppState, ClaudeClient, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env();
    if config.credential.is_configured() {
        tracing::info!("Using API key: {}", config.credential.masked());
    } else {
        tracing::warn!("ANTHROPIC_API_KEY is not configured; analysis requests will fail until it is set");
    }

    let state = AppState {
        provider: Arc::new(ClaudeClient::new(config.credential.clone(), config.api_base.clone())),
    };
    let app = router(state, config.max_upload_bytes);

    let addr = config.listen_addr();
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
