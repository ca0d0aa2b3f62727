//! Free Dictionary API connector (JSON)

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::http::endpoint_url;
use super::{ConnectorError, FetchResult, HttpFetcher, SourceEndpoint};
use crate::models::{CanonicalRecord, SourceId};

pub const DEFAULT_BASE_URL: &str = "https://api.dictionaryapi.dev";

const DEFINITIONS_PER_MEANING: usize = 2;
const MAX_MEANING_LINES: usize = 5;
const MAX_EXAMPLES: usize = 2;

#[derive(Debug, Clone)]
pub struct FreeDictClient {
    base_url: String,
    timeout: Duration,
}

impl FreeDictClient {
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
        let url = endpoint_url(&self.base_url, &["api", "v2", "entries", "en", word])?;
        match http.get_text(url, self.timeout, cancel).await? {
            Some(body) => parse_response(&body, word),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    phonetic: Option<String>,
    #[serde(default)]
    phonetics: Vec<Phonetic>,
    #[serde(default)]
    meanings: Vec<Meaning>,
}

#[derive(Debug, Deserialize)]
struct Phonetic {
    #[serde(default)]
    audio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Meaning {
    #[serde(default, rename = "partOfSpeech")]
    part_of_speech: Option<String>,
    #[serde(default)]
    definitions: Vec<Definition>,
}

#[derive(Debug, Deserialize)]
struct Definition {
    #[serde(default)]
    definition: Option<String>,
    #[serde(default)]
    example: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Normalize an entries response; only the first entry is used
pub fn parse_response(body: &str, word: &str) -> FetchResult {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ConnectorError::Parse(format!("Invalid JSON from Free Dictionary: {}", e)))?;

    let Some(first) = value.as_array().and_then(|entries| entries.first()) else {
        return Ok(None);
    };

    let entry: Entry = serde_json::from_value(first.clone())
        .map_err(|e| ConnectorError::Parse(format!("Unexpected entry shape: {}", e)))?;

    let mut record = CanonicalRecord::new(SourceId::FreeDict, word);
    record.phonetic = non_empty(&entry.phonetic).unwrap_or_default().to_string();
    record.audio = entry
        .phonetics
        .iter()
        .find_map(|p| non_empty(&p.audio))
        .unwrap_or_default()
        .to_string();

    let mut meanings = Vec::new();
    let mut examples = Vec::new();
    for meaning in &entry.meanings {
        let pos = non_empty(&meaning.part_of_speech).unwrap_or_default();
        for def in meaning.definitions.iter().take(DEFINITIONS_PER_MEANING) {
            if let Some(text) = non_empty(&def.definition) {
                meanings.push(format!("{}. {}", pos, text));
            }
            if let Some(example) = non_empty(&def.example) {
                examples.push(example.to_string());
            }
        }
    }

    meanings.truncate(MAX_MEANING_LINES);
    examples.truncate(MAX_EXAMPLES);
    record.meaning = meanings.join("\n");
    record.example = examples.join("\n");

    Ok(Some(record))
}
