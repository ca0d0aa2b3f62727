//! Word lookup endpoints
//!
//! - `GET /api/dictionary/lookup/:word?sources=a,b` - aggregate the enabled sources
//! - `POST /api/dictionary/aggregate` - same, with an upstream-resolved record

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::{parse_source_list, AggregateResult, CanonicalRecord, SourceId};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    /// Comma-separated source ids; defaults to the configured set
    pub sources: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AggregateRequest {
    pub word: String,
    #[serde(default)]
    pub sources: Option<Vec<SourceId>>,
    /// Record already resolved by the caller; becomes the primary
    #[serde(default)]
    pub external: Option<CanonicalRecord>,
}

fn normalize_word(word: &str) -> ApiResult<&str> {
    let word = word.trim();
    if word.is_empty() {
        return Err(ApiError::BadRequest("word must not be empty".to_string()));
    }
    Ok(word)
}

async fn run_aggregate(
    state: &AppState,
    word: &str,
    sources: Vec<SourceId>,
    external: Option<CanonicalRecord>,
) -> ApiResult<Json<AggregateResult>> {
    info!(word = %word, sources = ?sources, external = external.is_some(), "Dictionary lookup requested");

    let result = state.aggregator.aggregate(word, &sources, external).await;
    if !result.is_found() {
        return Err(ApiError::NotFound(format!(
            "No dictionary entry found for '{}'",
            word
        )));
    }

    Ok(Json(result))
}

/// GET /api/dictionary/lookup/:word
pub async fn lookup_word(
    State(state): State<AppState>,
    Path(word): Path<String>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<AggregateResult>> {
    let word = normalize_word(&word)?;

    let sources = match query.sources.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(list) => parse_source_list(list)?,
        None => state.config.aggregate.enabled_sources.clone(),
    };

    run_aggregate(&state, word, sources, None).await
}

/// POST /api/dictionary/aggregate
pub async fn aggregate_word(
    State(state): State<AppState>,
    Json(request): Json<AggregateRequest>,
) -> ApiResult<Json<AggregateResult>> {
    let word = normalize_word(&request.word)?;
    let sources = request
        .sources
        .unwrap_or_else(|| state.config.aggregate.enabled_sources.clone());

    run_aggregate(&state, word, sources, request.external).await
}

pub fn lookup_routes() -> Router<AppState> {
    Router::new()
        .route("/api/dictionary/lookup/:word", get(lookup_word))
        .route("/api/dictionary/aggregate", post(aggregate_word))
}
