//! vocab-dict library interface
//!
//! Dictionary lookup service: concurrent multi-source aggregation with a
//! two-tier cache, exposed over HTTP by the `vocab-dict` binary.

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod merge;
pub mod models;
pub mod sources;

pub use crate::aggregator::{Aggregator, AggregatorSettings};
pub use crate::cache::{CacheStore, CacheTtl};
pub use crate::config::DictConfig;
pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use vocab_common::{Clock, SystemClock};

use crate::sources::{ConnectorError, HttpFetcher, DEFAULT_USER_AGENT};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub cache: Arc<CacheStore>,
    pub config: Arc<DictConfig>,
    /// Shared pooled client, also used by routes outside the aggregator
    pub http: HttpFetcher,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        aggregator: Arc<Aggregator>,
        cache: Arc<CacheStore>,
        http: HttpFetcher,
        config: DictConfig,
    ) -> Self {
        Self {
            aggregator,
            cache,
            config: Arc::new(config),
            http,
            startup_time: Utc::now(),
        }
    }

    /// Wire the cache and live connectors from configuration
    pub fn from_config(config: DictConfig, db: SqlitePool) -> Result<Self, ConnectorError> {
        Self::with_clock(config, db, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: DictConfig,
        db: SqlitePool,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConnectorError> {
        let http = HttpFetcher::new(DEFAULT_USER_AGENT)?;
        let cache = Arc::new(CacheStore::new(db, config.cache.ttl(), clock));
        let aggregator = Arc::new(Aggregator::with_live_sources(
            &http,
            Arc::clone(&cache),
            &config.sources,
            config.aggregate.settings(),
        ));

        Ok(Self::new(aggregator, cache, http, config))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::lookup_routes())
        .merge(api::cache_routes())
        .merge(api::audio_routes())
        .merge(api::translate_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
