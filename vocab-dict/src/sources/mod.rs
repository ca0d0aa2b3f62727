//! Dictionary source connectors
//!
//! Every external source is one variant of [`SourceConnector`]; adding a
//! source means adding a variant, and the compiler then points at every
//! dispatch site that needs updating. The aggregator talks to sources only
//! through the [`DictionarySource`] trait, which lets tests inject mocks.
//!
//! # Outcomes
//! A fetch yields one of:
//! - `Ok(Some(record))` - the source knows the word
//! - `Ok(None)` - the source answered but has no entry
//! - `Err(ConnectorError)` - transport, status, parse or cancellation failure

pub mod bing;
pub mod cambridge;
pub mod freedict;
pub mod html;
pub mod http;
pub mod youdao;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::models::{CanonicalRecord, SourceId};

pub use bing::BingClient;
pub use cambridge::CambridgeClient;
pub use freedict::FreeDictClient;
pub use http::{HttpFetcher, DEFAULT_USER_AGENT};
pub use youdao::YoudaoClient;

/// Result of asking one source about one word
pub type FetchResult = Result<Option<CanonicalRecord>, ConnectorError>;

/// Source connector failures
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl ConnectorError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ConnectorError::Timeout
        } else {
            ConnectorError::Network(err.to_string())
        }
    }
}

/// Capability shared by every source the aggregator can query
#[async_trait]
pub trait DictionarySource: Send + Sync {
    fn source_id(&self) -> SourceId;

    /// Look up `word`; must return `Err(Cancelled)` promptly once `cancel` fires
    async fn fetch(&self, word: &str, cancel: &CancellationToken) -> FetchResult;
}

/// Where and how long to ask one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEndpoint {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl SourceEndpoint {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Endpoint settings for every source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceEndpoints {
    pub youdao: SourceEndpoint,
    pub cambridge: SourceEndpoint,
    pub bing: SourceEndpoint,
    pub freedict: SourceEndpoint,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            youdao: SourceEndpoint::new(youdao::DEFAULT_BASE_URL, 10),
            cambridge: SourceEndpoint::new(cambridge::DEFAULT_BASE_URL, 10),
            bing: SourceEndpoint::new(bing::DEFAULT_BASE_URL, 8),
            freedict: SourceEndpoint::new(freedict::DEFAULT_BASE_URL, 8),
        }
    }
}

impl SourceEndpoints {
    pub fn get(&self, source: SourceId) -> &SourceEndpoint {
        match source {
            SourceId::Youdao => &self.youdao,
            SourceId::Cambridge => &self.cambridge,
            SourceId::Bing => &self.bing,
            SourceId::FreeDict => &self.freedict,
        }
    }

    pub fn get_mut(&mut self, source: SourceId) -> &mut SourceEndpoint {
        match source {
            SourceId::Youdao => &mut self.youdao,
            SourceId::Cambridge => &mut self.cambridge,
            SourceId::Bing => &mut self.bing,
            SourceId::FreeDict => &mut self.freedict,
        }
    }

    /// Point every source at the same base URL (fixture servers)
    pub fn all_at(base_url: &str) -> Self {
        let mut endpoints = Self::default();
        for source in SourceId::ALL {
            endpoints.get_mut(source).base_url = base_url.to_string();
        }
        endpoints
    }
}

/// The closed set of real sources
#[derive(Debug, Clone)]
pub enum SourceConnector {
    Youdao(YoudaoClient),
    Cambridge(CambridgeClient),
    Bing(BingClient),
    FreeDict(FreeDictClient),
}

impl SourceConnector {
    pub fn for_source(source: SourceId, endpoint: &SourceEndpoint) -> Self {
        match source {
            SourceId::Youdao => SourceConnector::Youdao(YoudaoClient::new(endpoint)),
            SourceId::Cambridge => SourceConnector::Cambridge(CambridgeClient::new(endpoint)),
            SourceId::Bing => SourceConnector::Bing(BingClient::new(endpoint)),
            SourceId::FreeDict => SourceConnector::FreeDict(FreeDictClient::new(endpoint)),
        }
    }

    pub fn source_id(&self) -> SourceId {
        match self {
            SourceConnector::Youdao(_) => SourceId::Youdao,
            SourceConnector::Cambridge(_) => SourceId::Cambridge,
            SourceConnector::Bing(_) => SourceId::Bing,
            SourceConnector::FreeDict(_) => SourceId::FreeDict,
        }
    }

    /// Query the live source, bypassing the cache
    pub async fn lookup(
        &self,
        http: &HttpFetcher,
        word: &str,
        cancel: &CancellationToken,
    ) -> FetchResult {
        match self {
            SourceConnector::Youdao(client) => client.lookup(http, word, cancel).await,
            SourceConnector::Cambridge(client) => client.lookup(http, word, cancel).await,
            SourceConnector::Bing(client) => client.lookup(http, word, cancel).await,
            SourceConnector::FreeDict(client) => client.lookup(http, word, cancel).await,
        }
    }
}

/// Live connector fronted by the shared cache
///
/// Cache hits skip the network entirely. Only found records are cached;
/// "not found" and errors are re-queried next time.
pub struct CachedSource {
    connector: SourceConnector,
    http: HttpFetcher,
    cache: Arc<CacheStore>,
}

impl CachedSource {
    pub fn new(connector: SourceConnector, http: HttpFetcher, cache: Arc<CacheStore>) -> Self {
        Self {
            connector,
            http,
            cache,
        }
    }
}

#[async_trait]
impl DictionarySource for CachedSource {
    fn source_id(&self) -> SourceId {
        self.connector.source_id()
    }

    async fn fetch(&self, word: &str, cancel: &CancellationToken) -> FetchResult {
        let source = self.connector.source_id();

        if let Some(cached) = self.cache.get(word, source).await {
            debug!(word = %word, source = %source, "Serving record from cache");
            return Ok(Some(cached));
        }

        let result = self.connector.lookup(&self.http, word, cancel).await;

        if let Ok(Some(record)) = &result {
            if let Err(e) = self.cache.set(word, source, record).await {
                warn!(word = %word, source = %source, error = %e, "Failed to cache record");
            }
        }

        result
    }
}

/// Build cache-fronted connectors for every known source
pub fn build_sources(
    http: &HttpFetcher,
    cache: Arc<CacheStore>,
    endpoints: &SourceEndpoints,
) -> Vec<Arc<dyn DictionarySource>> {
    SourceId::ALL
        .iter()
        .map(|&source| {
            let connector = SourceConnector::for_source(source, endpoints.get(source));
            Arc::new(CachedSource::new(connector, http.clone(), Arc::clone(&cache)))
                as Arc<dyn DictionarySource>
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_variant_matches_source() {
        let endpoints = SourceEndpoints::default();
        for source in SourceId::ALL {
            let connector = SourceConnector::for_source(source, endpoints.get(source));
            assert_eq!(connector.source_id(), source);
        }
    }

    #[test]
    fn test_default_timeouts() {
        let endpoints = SourceEndpoints::default();
        assert_eq!(endpoints.youdao.timeout(), Duration::from_secs(10));
        assert_eq!(endpoints.cambridge.timeout(), Duration::from_secs(10));
        assert_eq!(endpoints.bing.timeout(), Duration::from_secs(8));
        assert_eq!(endpoints.freedict.timeout(), Duration::from_secs(8));
    }

    #[test]
    fn test_all_at_overrides_every_base_url() {
        let endpoints = SourceEndpoints::all_at("http://127.0.0.1:4000");
        for source in SourceId::ALL {
            assert_eq!(endpoints.get(source).base_url, "http://127.0.0.1:4000");
        }
        assert_eq!(endpoints.bing.timeout_secs, 8);
    }

    #[test]
    fn test_partial_endpoint_table_keeps_defaults() {
        let endpoints: SourceEndpoints = toml::from_str(
            r#"
            [bing]
            base_url = "http://localhost:1"
            timeout_secs = 2
            "#,
        )
        .unwrap();

        assert_eq!(endpoints.bing, SourceEndpoint::new("http://localhost:1", 2));
        assert_eq!(endpoints.youdao, SourceEndpoints::default().youdao);
    }
}
