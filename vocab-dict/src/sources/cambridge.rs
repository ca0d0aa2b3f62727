//! Cambridge English-Chinese dictionary connector (HTML)

use scraper::Html;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::html::{clean_text, exists, first_text, selector};
use super::http::endpoint_url;
use super::{FetchResult, HttpFetcher, SourceEndpoint};
use crate::models::{CanonicalRecord, SourceId};

pub const DEFAULT_BASE_URL: &str = "https://dictionary.cambridge.org";

const MAX_DEFINITION_BLOCKS: usize = 3;
const MAX_EXAMPLES_PER_BLOCK: usize = 2;
const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Clone)]
pub struct CambridgeClient {
    base_url: String,
    timeout: Duration,
}

impl CambridgeClient {
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
        let url = endpoint_url(
            &self.base_url,
            &["dictionary", "english-chinese-simplified", word],
        )?;
        match http.get_text(url, self.timeout, cancel).await? {
            Some(body) => parse_page(&body, word),
            None => Ok(None),
        }
    }
}

/// Normalize a Cambridge entry page
///
/// Unknown words redirect to a search page without a title block.
pub fn parse_page(body: &str, word: &str) -> FetchResult {
    let doc = Html::parse_document(body);

    if !exists(&doc, &selector("div.di-title")?) {
        return Ok(None);
    }

    let mut record = CanonicalRecord::new(SourceId::Cambridge, word);

    if let Some(us) = doc.select(&selector("span.us")?).next() {
        let pron = first_text(us, &selector("span.pron")?);
        if !pron.is_empty() {
            record.phonetic = format!("US {}", pron);
        }
    }

    let definition = selector("div.ddef_h div.def")?;
    let translation = selector("span.trans")?;
    let example_block = selector("div.examp")?;
    let example_sentence = selector("span.eg")?;

    let mut meanings = Vec::new();
    let mut examples = Vec::new();

    for block in doc.select(&selector("div.def-block")?).take(MAX_DEFINITION_BLOCKS) {
        let english = first_text(block, &definition);
        let chinese = first_text(block, &translation);
        if !english.is_empty() || !chinese.is_empty() {
            meanings.push(format!("• {}", format!("{} {}", english, chinese).trim()));
        }

        for examp in block.select(&example_block).take(MAX_EXAMPLES_PER_BLOCK) {
            let Some(eg) = examp.select(&example_sentence).next() else {
                continue;
            };
            let mut text = clean_text(eg);
            let trans = first_text(examp, &translation);
            if !trans.is_empty() {
                text = format!("{}\n{}", text, trans);
            }
            examples.push(text);
        }
    }

    examples.truncate(MAX_EXAMPLES);
    record.meaning = meanings.join("\n");
    record.example = examples.join("\n");

    Ok(Some(record))
}
