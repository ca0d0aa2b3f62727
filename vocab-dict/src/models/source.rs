//! Dictionary source identifiers and priority orders

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One external lexical data provider
///
/// Closed set: adding a provider means adding a variant here, and every
/// `match` over `SourceId` then has to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Youdao,
    Cambridge,
    Bing,
    FreeDict,
}

impl SourceId {
    /// Every source, in declaration order
    pub const ALL: [SourceId; 4] = [
        SourceId::Youdao,
        SourceId::Cambridge,
        SourceId::Bing,
        SourceId::FreeDict,
    ];

    /// Order used to pick the primary record
    pub const PRIMARY_PRIORITY: [SourceId; 3] =
        [SourceId::Youdao, SourceId::Cambridge, SourceId::Bing];

    /// Order used to pick a richer phonetic transcription
    pub const PHONETIC_PRIORITY: [SourceId; 3] =
        [SourceId::Cambridge, SourceId::Youdao, SourceId::Bing];

    /// Order in which example sentences are merged
    pub const MERGE_ORDER: [SourceId; 4] = [
        SourceId::Cambridge,
        SourceId::Youdao,
        SourceId::Bing,
        SourceId::FreeDict,
    ];

    /// Stable identifier used on the wire and as the cache key
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Youdao => "youdao",
            SourceId::Cambridge => "cambridge",
            SourceId::Bing => "bing",
            SourceId::FreeDict => "freedict",
        }
    }

    /// Human-readable source name shown next to results
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceId::Youdao => "有道词典",
            SourceId::Cambridge => "剑桥词典 (Cambridge)",
            SourceId::Bing => "Bing 词典",
            SourceId::FreeDict => "Free Dictionary",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized source name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown dictionary source: {0}")]
pub struct UnknownSource(pub String);

impl FromStr for SourceId {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        SourceId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownSource(needle.to_string()))
    }
}

/// Parse a comma-separated source list (e.g. `"cambridge,bing"`)
///
/// Blank segments are ignored; duplicates collapse.
pub fn parse_source_list(list: &str) -> Result<Vec<SourceId>, UnknownSource> {
    let mut sources = Vec::new();
    for part in list.split(',').filter(|p| !p.trim().is_empty()) {
        let id: SourceId = part.parse()?;
        if !sources.contains(&id) {
            sources.push(id);
        }
    }
    Ok(sources)
}
