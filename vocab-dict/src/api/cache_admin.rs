//! Operator cache endpoints

use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::cache::CacheStats;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PurgeRequest {
    /// Entries older than this are removed; defaults to the durable TTL
    #[serde(default)]
    pub max_age_seconds: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

/// GET /api/dictionary/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> ApiResult<Json<CacheStats>> {
    Ok(Json(state.cache.stats().await?))
}

/// POST /api/dictionary/cache/purge
pub async fn purge_cache(
    State(state): State<AppState>,
    body: Option<Json<PurgeRequest>>,
) -> ApiResult<Json<DeletedResponse>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let max_age = request
        .max_age_seconds
        .map(Duration::from_secs)
        .unwrap_or(state.cache.ttl().durable);

    let deleted = state.cache.purge_older_than(max_age).await?;
    info!(max_age_secs = max_age.as_secs(), deleted, "Cache purge requested");

    Ok(Json(DeletedResponse { deleted }))
}

/// DELETE /api/dictionary/cache
pub async fn clear_cache(State(state): State<AppState>) -> ApiResult<Json<DeletedResponse>> {
    let deleted = state.cache.clear_all().await?;
    info!(deleted, "Cache cleared");

    Ok(Json(DeletedResponse { deleted }))
}

pub fn cache_routes() -> Router<AppState> {
    Router::new()
        .route("/api/dictionary/cache/stats", get(cache_stats))
        .route("/api/dictionary/cache/purge", post(purge_cache))
        .route("/api/dictionary/cache", delete(clear_cache))
}
