//! Free-text translation
//!
//! `POST /api/dictionary/translate` with `{"text": "..."}`, answered from the
//! Youdao mobile translate page. Not cached.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::sources::youdao;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub original: String,
    pub translation: String,
}

/// POST /api/dictionary/translate
pub async fn translate_text(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> ApiResult<Json<TranslateResponse>> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }

    info!(chars = text.chars().count(), "Translation requested");

    // Abandons the upstream request if the client goes away
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let result = youdao::translate(&state.http, &state.config.translate, text, &cancel).await;
    match result {
        Ok(Some(translation)) => Ok(Json(TranslateResponse {
            original: request.text,
            translation,
        })),
        Ok(None) => Err(ApiError::Upstream("Translation failed".to_string())),
        Err(e) => {
            warn!(error = %e, "Translation request failed");
            Err(ApiError::Upstream(format!("Translation failed: {}", e)))
        }
    }
}

pub fn translate_routes() -> Router<AppState> {
    Router::new().route("/api/dictionary/translate", post(translate_text))
}
