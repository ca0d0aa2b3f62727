//! Canonical word record shared by every source

use serde::{Deserialize, Serialize};

use super::SourceId;

/// Normalized word data produced by one source
///
/// Absent fields are empty strings. Records are not mutated after a source
/// produces them; aggregation copies fields into a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub phonetic: String,
    /// Possibly multi-line
    #[serde(default)]
    pub meaning: String,
    /// Possibly multi-line, bilingual lines interleaved
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub roots: String,
    #[serde(default)]
    pub synonyms: String,
    #[serde(default)]
    pub tags: String,
    /// Pronunciation audio URL
    #[serde(default)]
    pub audio: String,
    pub source: SourceId,
    #[serde(default)]
    pub source_name: String,
}

impl CanonicalRecord {
    /// Empty record for `word` attributed to `source`
    pub fn new(source: SourceId, word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            phonetic: String::new(),
            meaning: String::new(),
            example: String::new(),
            roots: String::new(),
            synonyms: String::new(),
            tags: String::new(),
            audio: String::new(),
            source,
            source_name: source.display_name().to_string(),
        }
    }

    pub fn with_phonetic(mut self, phonetic: impl Into<String>) -> Self {
        self.phonetic = phonetic.into();
        self
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = meaning.into();
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }
}
