//! Pronunciation audio links

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::sources::youdao::{audio_url, Accent};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AudioQuery {
    /// `us` (default) or `uk`
    pub accent: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AudioResponse {
    pub word: String,
    pub accent: String,
    pub audio_url: String,
}

/// GET /api/dictionary/audio/:word
pub async fn audio_link(
    State(state): State<AppState>,
    Path(word): Path<String>,
    Query(query): Query<AudioQuery>,
) -> ApiResult<Json<AudioResponse>> {
    let word = word.trim();
    if word.is_empty() {
        return Err(ApiError::BadRequest("word must not be empty".to_string()));
    }

    let accent = match query.accent.as_deref() {
        Some(raw) => raw
            .parse::<Accent>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => Accent::Us,
    };

    let url = audio_url(&state.config.sources.youdao.base_url, word, accent)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(AudioResponse {
        word: word.to_string(),
        accent: accent.to_string(),
        audio_url: url.to_string(),
    }))
}

pub fn audio_routes() -> Router<AppState> {
    Router::new().route("/api/dictionary/audio/:word", get(audio_link))
}
