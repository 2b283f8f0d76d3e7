//! respcache - HTTP response caching server
//!
//! Serves a small JSON API with read-through caching of GET responses and
//! write-through updates for user profiles.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use respcache::{
    create_router, spawn_cleanup_task, AppState, CacheSettings, CacheStore, Config,
    HttpRateSource, MemoryCacheStore, RedisCacheStore, SqliteProfileStore,
};

/// Main entry point for the caching server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the profile database and cache store
/// 4. Start background TTL cleanup task when caching in-process
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "respcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting respcache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, database={}, namespace={}, cache_enabled={}",
        config.server_port, config.database_path, config.cache_namespace, config.cache_enabled
    );

    let profiles = SqliteProfileStore::connect(&config.database_path)
        .await
        .context("failed to open profile database")?;
    profiles
        .ensure_schema()
        .await
        .context("failed to prepare profile schema")?;

    let (cache, cleanup_handle) = build_cache_store(&config).await?;

    let rates = HttpRateSource::new(
        config.exchange_rate_url.clone(),
        Duration::from_secs(config.upstream_timeout),
    )
    .context("failed to build upstream client")?;

    let state = AppState::new(
        cache,
        Arc::new(profiles.clone()),
        Arc::new(rates),
        CacheSettings::from_config(&config),
    );
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
    profiles.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Connects to Redis when configured, otherwise falls back to the
/// in-process store together with its sweeper task.
async fn build_cache_store(
    config: &Config,
) -> anyhow::Result<(Arc<dyn CacheStore>, Option<JoinHandle<()>>)> {
    match &config.redis_url {
        Some(url) => {
            let store = RedisCacheStore::connect(url, Duration::from_millis(config.cache_timeout_ms))
                .await
                .context("failed to connect to Redis")?;
            let store: Arc<dyn CacheStore> = Arc::new(store);
            Ok((store, None))
        }
        None => {
            info!("REDIS_URI not set, caching in process memory");
            let store = Arc::new(MemoryCacheStore::new());
            let handle = spawn_cleanup_task(store.clone(), config.cleanup_interval);
            let store: Arc<dyn CacheStore> = store;
            Ok((store, Some(handle)))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
