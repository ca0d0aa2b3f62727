//! Shared HTTP client for all dictionary sources
//!
//! One pooled `reqwest::Client` is built at startup and cloned into every
//! connector (clones share the connection pool). Each request carries its
//! own per-source timeout and races a cancellation token.

use reqwest::{header, Client, RequestBuilder, StatusCode, Url};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::ConnectorError;

/// Browser-like User-Agent; several sources serve reduced pages to bots
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Idle connections kept per host
const POOL_MAX_IDLE_PER_HOST: usize = 20;

/// Connection establishment timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Pooled HTTP client
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build the shared client
    pub fn new(user_agent: &str) -> Result<Self, ConnectorError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US,en;q=0.9,zh-CN;q=0.8,zh;q=0.7"),
        );

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ConnectorError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// GET `url` and return the body text
    ///
    /// - 404 → `Ok(None)` (word not present)
    /// - other non-success status → `Err(Status)`
    /// - token cancelled first → `Err(Cancelled)`; the request future is dropped
    pub async fn get_text(
        &self,
        url: Url,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, ConnectorError> {
        debug!(url = %url, timeout_ms = timeout.as_millis() as u64, "Sending dictionary request");
        self.send_text(self.client.get(url).timeout(timeout), cancel).await
    }

    /// POST `form` url-encoded to `url`; same status mapping as [`Self::get_text`]
    pub async fn post_form_text(
        &self,
        url: Url,
        form: &[(&str, &str)],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, ConnectorError> {
        debug!(url = %url, timeout_ms = timeout.as_millis() as u64, "Sending form request");
        self.send_text(self.client.post(url).form(form).timeout(timeout), cancel).await
    }

    async fn send_text(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, ConnectorError> {
        let request = async {
            let response = request.send().await.map_err(ConnectorError::from_reqwest)?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !status.is_success() {
                return Err(ConnectorError::Status(status.as_u16()));
            }

            let body = response.text().await.map_err(ConnectorError::from_reqwest)?;
            Ok(Some(body))
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ConnectorError::Cancelled),
            result = request => result,
        }
    }
}

/// Append path segments to a base URL, percent-encoding each one
pub fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, ConnectorError> {
    let mut url = Url::parse(base)
        .map_err(|e| ConnectorError::Client(format!("Invalid base URL {}: {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| ConnectorError::Client(format!("Base URL cannot take a path: {}", base)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}
