//! Strata Server
//!
//! A self-hosted PDF hierarchy extraction service: PDF text extraction,
//! AI-assisted structure analysis and JSON export over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strata_server::ai::GatewayClient;
use strata_server::app;
use strata_server::config::Config;
use strata_server::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strata_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting Strata Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("AI gateway: {}", config.ai.gateway_url);
    tracing::info!("AI model: {}", config.ai.model);
    if config.ai.api_key.is_none() {
        tracing::warn!(
            "AI_GATEWAY_API_KEY is not set; analysis requests will fail with a configuration error"
        );
    }

    // Create application state around the gateway provider
    let provider = Arc::new(GatewayClient::new(config.ai.clone()));
    let state = AppState::new(config.clone(), provider);
    let app = app(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .expect("Invalid server address");
    tracing::info!("Strata Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    tracing::info!("Server shutdown complete");
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
