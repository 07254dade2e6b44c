use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::application::retry::RetryPolicy;
use crate::application::routes::app_router;
use crate::application::state::{AppState, AppStateConfig};

pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub feed_url: String,
    pub retry: RetryPolicy,
    pub upstream_timeout: Duration,
    pub max_concurrent_transforms: usize,
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let feed_url = url::Url::parse(&config.feed_url).context("invalid WALLFEED_FEED_URL URL")?;

    let state = AppState::from_config(AppStateConfig {
        feed_url,
        retry: config.retry,
        upstream_timeout: config.upstream_timeout,
        max_concurrent_transforms: config.max_concurrent_transforms,
    })?;

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address))?;

    let app = app_router(state);

    info!(
        address = %config.bind_address,
        feed = %config.feed_url,
        max_retries = config.retry.max_retries(),
        upstream_timeout_secs = config.upstream_timeout.as_secs(),
        "starting HTTP server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    info!("server shutdown complete");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM and logs which one arrived.
#[allow(clippy::expect_used)] // Startup: panicking is appropriate if signal handlers fail
async fn shutdown_signal() {
    let interrupt = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    let received = tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    };
    info!(signal = received, "shutdown requested, draining in-flight requests");
}
