//! Aggregated lookup result

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{CanonicalRecord, SourceId};

/// Result of querying every enabled source for one word
///
/// `primary` is `None` exactly when `sources` is empty; callers treat that as
/// "word not found", not as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub primary: Option<CanonicalRecord>,
    pub sources: BTreeMap<SourceId, CanonicalRecord>,
}

impl AggregateResult {
    /// Nothing found anywhere
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn is_found(&self) -> bool {
        self.primary.is_some()
    }
}
