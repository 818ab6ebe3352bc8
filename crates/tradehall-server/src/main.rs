mod config;
mod lifecycle;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use tradehall_api::state::{AppState, AppStateInner};

use crate::config::{Config, ConfigError, build_registry};
use crate::lifecycle::StartGuard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tradehall=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(ConfigError::PlaceholderSecret) => {
            eprintln!("FATAL: TRADEHALL_SERVICE_SECRET is unset or still a placeholder.");
            eprintln!("       Internal callers sign their service tokens with it.");
            eprintln!("       Set it in your .env file and restart.");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let brokers = build_registry(config.brokers)?;
    if brokers.is_empty() {
        tracing::warn!("No brokers configured; set TRADEHALL_BROKERS to enable signing");
    }
    for summary in brokers.summaries() {
        info!(broker = %summary.name, scheme = %summary.scheme, base_url = %summary.base_url, "Broker registered");
    }

    let state: AppState = Arc::new(AppStateInner {
        brokers,
        service_secret: config.service_secret,
    });

    let app = tradehall_api::router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("TradeHall signing service listening on {}", addr);

    let guard = StartGuard::new();
    serve(&guard, listener, app).await
}

/// Serve until shutdown. Refuses to run twice from the same guard.
async fn serve(guard: &StartGuard, listener: tokio::net::TcpListener, app: Router) -> anyhow::Result<()> {
    if !guard.start() {
        anyhow::bail!("signing service already started");
    }
    debug_assert!(guard.is_started());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Signing service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
