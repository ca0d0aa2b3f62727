//! Bing dictionary connector (HTML)

use scraper::Html;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::html::{clean_text, first_text, selector};
use super::http::endpoint_url;
use super::{FetchResult, HttpFetcher, SourceEndpoint};
use crate::models::{CanonicalRecord, SourceId};

pub const DEFAULT_BASE_URL: &str = "https://cn.bing.com";

#[derive(Debug, Clone)]
pub struct BingClient {
    base_url: String,
    timeout: Duration,
}

impl BingClient {
    pub fn new(endpoint: &SourceEndpoint) -> Self {
        Self {
            base_url: endpoint.base_url.clone(),
            timeout: endpoint.timeout(),
        }
    }

    pub async fn lookup(
        &self,
        http: &HttpFetcher,
        word: &str,
        cancel: &CancellationToken,
    ) -> FetchResult {
        let mut url = endpoint_url(&self.base_url, &["dict", "search"])?;
        url.query_pairs_mut()
            .append_pair("q", word)
            .append_pair("mkt", "zh-cn")
            .append_pair("setlang", "zh-hans");

        match http.get_text(url, self.timeout, cancel).await? {
            Some(body) => parse_page(&body, word),
            None => Ok(None),
        }
    }
}

/// Normalize a Bing dictionary result page
pub fn parse_page(body: &str, word: &str) -> FetchResult {
    let doc = Html::parse_document(body);

    let Some(qdef) = doc.select(&selector("div.qdef")?).next() else {
        return Ok(None);
    };

    let mut record = CanonicalRecord::new(SourceId::Bing, word);

    if let Some(pr) = doc.select(&selector("div.hd_prUS")?).next() {
        record.phonetic = clean_text(pr);
    }

    record.meaning = qdef
        .select(&selector("li")?)
        .map(clean_text)
        .filter(|line| line.chars().count() > 1)
        .collect::<Vec<_>>()
        .join("\n");

    if let Some(sentence) = doc.select(&selector("div#sentenceSeg div.se_li")?).next() {
        let english = first_text(sentence, &selector("div.sen_en")?);
        let chinese = first_text(sentence, &selector("div.sen_cn")?);
        if !english.is_empty() && !chinese.is_empty() {
            record.example = format!("{}\n{}", english, chinese);
        }
    }

    Ok(Some(record))
}
