//! Application startup: logging, state and the HTTP server loop.

use std::net::SocketAddr;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::{Config, LogFormat};
use crate::router::build_router;

const DEFAULT_LOG_FILTER: &str = "webhook_receiver=debug,tower_http=debug";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    match log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Create the AppState from a loaded configuration.
pub fn initialize_app(config: Config) -> AppState {
    info!(
        environment = %config.environment,
        signature_header = %config.signature_header_key,
        webhook_url = %config.signature.canonical_url,
        max_age_secs = config.signature.max_age_secs,
        "Loaded configuration"
    );

    AppState::new(config)
}

/// Bind the listener and serve until a shutdown signal arrives.
pub async fn run(config: Config) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app_state = initialize_app(config);
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let port = listener.local_addr()?.port();

    info!("🚀 Webhook server running on http://localhost:{}", port);
    info!("📡 Webhook endpoint: http://localhost:{}/webhook", port);
    info!("❤️  Health check: http://localhost:{}/health", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
