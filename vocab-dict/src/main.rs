//! vocab-dict - Dictionary lookup microservice
//!
//! Aggregates word data from several online dictionaries, caches it in
//! `<root_folder>/vocab.db` and serves the merged result over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vocab_common::config::write_toml_config;
use vocab_dict::config::{CliArgs, DictConfig};
use vocab_dict::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = DictConfig::resolve(&args).context("Failed to resolve configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("vocab_dict={0},vocab_common={0},tower_http={0}", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting vocab-dict (Dictionary Lookup) microservice");
    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        build_timestamp = env!("BUILD_TIMESTAMP"),
        profile = env!("BUILD_PROFILE"),
        "Build information"
    );

    if args.write_config {
        let path = args
            .config_path()
            .context("No configuration directory available; pass --config")?;
        write_toml_config(&config, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Configuration written");
        return Ok(());
    }

    let root_folder = config.root_folder();
    info!(root_folder = %root_folder.display(), "Root folder resolved");

    let db_path = config.database_path();
    let db_pool = vocab_dict::db::init_database_pool(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!(database = %db_path.display(), "Database connection established");

    let enabled: Vec<String> = config
        .aggregate
        .enabled_sources
        .iter()
        .map(|s| s.to_string())
        .collect();
    info!(
        sources = %enabled.join(","),
        deadline_secs = config.aggregate.deadline_secs,
        max_concurrency = config.aggregate.max_concurrency,
        "Aggregator configured"
    );

    let bind_addr = config.bind_addr;
    let state = AppState::from_config(config, db_pool).context("Failed to build HTTP client")?;
    let cache = Arc::clone(&state.cache);
    let app = vocab_dict::build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!(cached_in_memory = cache.fast_len().await, "Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
