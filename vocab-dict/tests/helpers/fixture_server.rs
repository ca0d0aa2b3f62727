//! Local HTTP server serving canned dictionary pages
//!
//! Mirrors the URL layout of every live source so connectors can be pointed
//! at it through `SourceEndpoints::all_at`. The word `big` is known to every
//! source; `broken` answers 500 everywhere; `garbled` returns non-JSON from
//! the Free Dictionary path; `slow` stalls for five seconds. The translate
//! form echoes its input in a result list, except `good morning` (generated
//! block only) and `gibberish` (no translation at all).

use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const YOUDAO_BIG: &str = r#"
<html><body>
  <div class="phone_con"><span class="phonetic">/bɪɡ/</span><span class="phonetic">/bɪɡ/ (US)</span></div>
  <div class="trans-container"><ul><li>adj. 大的；重要的</li><li class="additional">[ 比较级 bigger ]</li></ul></div>
  <div id="bilingual"><ul><li><p>The house is big.</p><p>这房子很大。</p></li></ul></div>
  <div id="relWordTab">big 大的</div>
  <div id="synonyms">adj. large</div>
</body></html>
"#;

pub const YOUDAO_MISSING: &str =
    r#"<html><body><div class="error-wrapper">抱歉，没有找到</div></body></html>"#;

pub const CAMBRIDGE_BIG: &str = r#"
<html><body>
  <div class="di-title">big</div>
  <span class="us"><span class="pron">/bɪɡ/</span></span>
  <div class="def-block">
    <div class="ddef_h"><div class="def">large in size or amount</div></div>
    <div class="def-body">
      <span class="trans">大的</span>
      <div class="examp"><span class="eg">The house is big.</span><span class="trans">这房子很大。</span></div>
      <div class="examp"><span class="eg">a big problem</span><span class="trans">大问题</span></div>
    </div>
  </div>
</body></html>
"#;

pub const CAMBRIDGE_SEARCH: &str =
    r#"<html><body><div class="hfl-s">Search results</div></body></html>"#;

pub const BING_BIG: &str = r#"
<html><body>
  <div class="qdef">
    <div class="hd_prUS">美 [bɪɡ]</div>
    <ul><li>adj. 大的</li><li>adv. 夸大地</li></ul>
  </div>
  <div id="sentenceSeg">
    <div class="se_li"><div class="sen_en">He has a big dog.</div><div class="sen_cn">他有一只大狗。</div></div>
  </div>
</body></html>
"#;

pub const BING_MISSING: &str = r#"<html><body><div class="no_results"></div></body></html>"#;

pub const FREEDICT_BIG: &str = r#"[{
  "word": "big",
  "phonetic": "/bɪɡ/",
  "phonetics": [{"audio": "https://audio.example/big.mp3"}],
  "meanings": [{"partOfSpeech": "adjective", "definitions": [
    {"definition": "Of great size.", "example": "a big car"}
  ]}]
}]"#;

pub const FREEDICT_MISSING: &str = r#"{"title":"No Definitions Found"}"#;

#[derive(Clone, Default)]
struct FixtureState {
    hits: Arc<AtomicUsize>,
}

/// Running fixture server
pub struct FixtureServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl FixtureServer {
    /// Total requests served so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn special_case(word: &str) -> Option<Response> {
    match word {
        "broken" => Some(StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Some(StatusCode::OK.into_response())
        }
        _ => None,
    }
}

async fn youdao(State(state): State<FixtureState>, Path(word): Path<String>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = special_case(&word).await {
        return response;
    }
    match word.as_str() {
        "big" => Html(YOUDAO_BIG).into_response(),
        _ => Html(YOUDAO_MISSING).into_response(),
    }
}

async fn cambridge(State(state): State<FixtureState>, Path(word): Path<String>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = special_case(&word).await {
        return response;
    }
    match word.as_str() {
        "big" => Html(CAMBRIDGE_BIG).into_response(),
        _ => Html(CAMBRIDGE_SEARCH).into_response(),
    }
}

#[derive(Deserialize)]
struct BingQuery {
    q: String,
}

async fn bing(State(state): State<FixtureState>, Query(query): Query<BingQuery>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = special_case(&query.q).await {
        return response;
    }
    match query.q.as_str() {
        "big" => Html(BING_BIG).into_response(),
        _ => Html(BING_MISSING).into_response(),
    }
}

async fn freedict(State(state): State<FixtureState>, Path(word): Path<String>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = special_case(&word).await {
        return response;
    }
    let json = [(axum::http::header::CONTENT_TYPE, "application/json")];
    match word.as_str() {
        "big" => (json, FREEDICT_BIG).into_response(),
        "garbled" => Html("<html>maintenance</html>").into_response(),
        _ => (StatusCode::NOT_FOUND, json, FREEDICT_MISSING).into_response(),
    }
}

#[derive(Deserialize)]
struct TranslateForm {
    inputtext: String,
    #[serde(rename = "type")]
    kind: String,
}

async fn translate(State(state): State<FixtureState>, Form(form): Form<TranslateForm>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if form.kind != "AUTO" {
        return StatusCode::BAD_REQUEST.into_response();
    }
    if let Some(response) = special_case(&form.inputtext).await {
        return response;
    }
    match form.inputtext.as_str() {
        "good morning" => {
            Html(r#"<html><body><div class="generate"> 早上好 </div></body></html>"#).into_response()
        }
        "gibberish" => Html("<html><body><p>no result</p></body></html>").into_response(),
        text => Html(format!(
            r#"<html><body><ul id="translateResult"><li>译文：{}</li></ul></body></html>"#,
            text
        ))
        .into_response(),
    }
}

/// Bind to an ephemeral local port and serve fixtures in the background
pub async fn spawn_fixture_server() -> FixtureServer {
    let state = FixtureState::default();
    let hits = Arc::clone(&state.hits);

    let app = Router::new()
        .route("/w/eng/:word", get(youdao))
        .route("/dictionary/english-chinese-simplified/:word", get(cambridge))
        .route("/dict/search", get(bing))
        .route("/api/v2/entries/en/:word", get(freedict))
        .route("/translate", post(translate))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FixtureServer {
        base_url: format!("http://{}", addr),
        hits,
    }
}
