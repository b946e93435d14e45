use anyhow::{Context, Result};
use feed_manager::api::{create_router, ApiState};
use feed_manager::{build_sources, RefreshScheduler, SchedulerConfig};
use skyfuse::config::load_or_default;
use skyfuse::{ProximityDetector, WorldStore};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feed_manager=info,skyfuse=info".into()),
        )
        .init();

    info!("Feed manager starting...");

    let config_path =
        std::env::var("SKYFUSE_CONFIG").unwrap_or_else(|_| "skyfuse.toml".to_string());
    let config = load_or_default(&config_path).context("Invalid configuration")?;

    info!(
        config_path = %config_path,
        interval_secs = config.refresh.interval_seconds,
        source_timeout_secs = config.refresh.source_timeout_seconds,
        carry_forward = config.refresh.carry_forward_on_failure,
        bind_address = %config.api.bind_address,
        "Configuration loaded"
    );

    let store = Arc::new(WorldStore::new());
    let sources = build_sources(&config);
    info!(sources = sources.len(), "Position sources registered");

    let scheduler = RefreshScheduler::new(
        sources,
        Arc::clone(&store),
        ProximityDetector::new(config.thresholds.clone()),
        SchedulerConfig::from(&config.refresh),
    );
    let handle = scheduler.start();

    // Dashboard routes plus scheduler status
    let router = skyfuse::api::create_router(Arc::clone(&store)).merge(create_router(ApiState {
        status: handle.status(),
    }));
    let listener = tokio::net::TcpListener::bind(&config.api.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.api.bind_address))?;
    info!(address = %config.api.bind_address, "Dashboard API listening");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server_handle = tokio::spawn(async move {
        let shutdown = async {
            let _ = shutdown_rx.await;
        };
        if let Err(e) = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
        {
            tracing::error!(error = %e, "Dashboard API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(());
    handle.stop().await;
    if let Err(e) = server_handle.await {
        tracing::error!(error = %e, "Dashboard API task failed");
    }
    info!("Feed manager stopped");

    Ok(())
}
