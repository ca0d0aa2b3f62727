//! Youdao dictionary connector (HTML)
//!
//! Also owns the Youdao voice endpoint used for pronunciation audio links and
//! the mobile translate page used for free-text translation.

use reqwest::Url;
use scraper::{ElementRef, Html};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::html::{clean_text, enclosing_div_of_text, exists, selector};
use super::http::endpoint_url;
use super::{ConnectorError, FetchResult, HttpFetcher, SourceEndpoint};
use crate::models::{CanonicalRecord, SourceId};

pub const DEFAULT_BASE_URL: &str = "https://dict.youdao.com";

/// Mobile site hosting the free-text translate form
pub const DEFAULT_TRANSLATE_BASE_URL: &str = "http://m.youdao.com";
pub const DEFAULT_TRANSLATE_TIMEOUT_SECS: u64 = 5;

const ROOTS_MARKER: &str = "词根";
const SYNONYMS_MARKER: &str = "同近义词";

#[derive(Debug, Clone)]
pub struct YoudaoClient {
    base_url: String,
    timeout: Duration,
}

impl YoudaoClient {
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
        let url = endpoint_url(&self.base_url, &["w", "eng", word])?;
        match http.get_text(url, self.timeout, cancel).await? {
            Some(body) => parse_page(&body, word),
            None => Ok(None),
        }
    }
}

/// Translate free text through the mobile translate form
///
/// `Ok(None)` when the page carries no translation.
pub async fn translate(
    http: &HttpFetcher,
    endpoint: &SourceEndpoint,
    text: &str,
    cancel: &CancellationToken,
) -> Result<Option<String>, ConnectorError> {
    let url = endpoint_url(&endpoint.base_url, &["translate"])?;
    let form = [("inputtext", text), ("type", "AUTO")];
    match http.post_form_text(url, &form, endpoint.timeout(), cancel).await? {
        Some(body) => parse_translation(&body),
        None => Ok(None),
    }
}

/// Translation from the result list, else from the generated block
pub fn parse_translation(body: &str) -> Result<Option<String>, ConnectorError> {
    let doc = Html::parse_document(body);

    let translated = match doc.select(&selector("ul#translateResult li")?).next() {
        Some(li) => clean_text(li),
        None => doc
            .select(&selector("div.generate")?)
            .next()
            .map(clean_text)
            .unwrap_or_default(),
    };

    Ok(Some(translated).filter(|t| !t.is_empty()))
}

/// Normalize a Youdao word page
pub fn parse_page(body: &str, word: &str) -> FetchResult {
    let doc = Html::parse_document(body);

    if exists(&doc, &selector("div.error-wrapper")?) {
        return Ok(None);
    }

    let mut record = CanonicalRecord::new(SourceId::Youdao, word);

    // The second transcription is the US one when both are shown
    let phonetics: Vec<ElementRef<'_>> = doc.select(&selector("span.phonetic")?).collect();
    if let Some(el) = phonetics.get(1).or_else(|| phonetics.first()) {
        record.phonetic = clean_text(*el);
    }

    let li = selector("li")?;
    if let Some(ul) = doc.select(&selector("div.trans-container ul")?).next() {
        record.meaning = ul
            .select(&li)
            .filter(|item| item.value().attr("class").is_none())
            .map(clean_text)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
    }

    if let Some(first) = doc.select(&selector("div#bilingual li")?).next() {
        let paragraphs: Vec<String> = first.select(&selector("p")?).take(2).map(clean_text).collect();
        if let [english, translation] = paragraphs.as_slice() {
            record.example = format!("{}\n{}", english, translation);
        }
    }

    record.roots = match enclosing_div_of_text(&doc, ROOTS_MARKER) {
        Some(div) => clean_text(div).replace(ROOTS_MARKER, "[词根]"),
        None => doc
            .select(&selector("div#relWordTab")?)
            .next()
            .map(clean_text)
            .unwrap_or_default(),
    };

    record.synonyms = match doc.select(&selector("div#synonyms")?).next() {
        Some(div) => clean_text(div),
        None => enclosing_div_of_text(&doc, SYNONYMS_MARKER)
            .map(clean_text)
            .unwrap_or_default(),
    };

    Ok(Some(record))
}

/// Pronunciation accent served by the Youdao voice endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Uk,
    Us,
}

impl Accent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Accent::Uk => "uk",
            Accent::Us => "us",
        }
    }

    fn voice_type(&self) -> &'static str {
        match self {
            Accent::Uk => "1",
            Accent::Us => "2",
        }
    }
}

impl fmt::Display for Accent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Accent {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uk" => Ok(Accent::Uk),
            "us" => Ok(Accent::Us),
            other => Err(ConnectorError::Client(format!("Unknown accent: {}", other))),
        }
    }
}

/// Voice URL for `word` spoken with `accent`
pub fn audio_url(base_url: &str, word: &str, accent: Accent) -> Result<Url, ConnectorError> {
    let mut url = endpoint_url(base_url, &["dictvoice"])?;
    url.query_pairs_mut()
        .append_pair("audio", word)
        .append_pair("type", accent.voice_type());
    Ok(url)
}
