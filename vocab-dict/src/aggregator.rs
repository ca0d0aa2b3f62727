//! Multi-source lookup aggregation
//!
//! Queries the enabled sources concurrently (bounded) under one overall
//! deadline, picks the primary record, enriches its phonetic and replaces its
//! example with the merged examples of every source that answered.
//!
//! # Deadline
//! Each source runs as its own task, gated by a semaphore of
//! `max_concurrency` permits. When the deadline fires the shared
//! [`CancellationToken`] is cancelled and the remaining tasks are aborted.
//! Results that arrive later are never observed; `sources` is only written by
//! the collecting loop.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cache::CacheStore;
use crate::merge::merge_in_priority_order;
use crate::models::{AggregateResult, CanonicalRecord, SourceId};
use crate::sources::{
    build_sources, ConnectorError, DictionarySource, FetchResult, HttpFetcher, SourceEndpoints,
};

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(12);
pub const DEFAULT_MAX_CONCURRENCY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorSettings {
    /// Overall wall-clock budget for one aggregate call
    pub deadline: Duration,
    /// Maximum simultaneous source fetches
    pub max_concurrency: usize,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

pub struct Aggregator {
    sources: Vec<Arc<dyn DictionarySource>>,
    settings: AggregatorSettings,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn DictionarySource>>, settings: AggregatorSettings) -> Self {
        Self { sources, settings }
    }

    /// Aggregator over the live, cache-fronted connectors
    pub fn with_live_sources(
        http: &HttpFetcher,
        cache: Arc<CacheStore>,
        endpoints: &SourceEndpoints,
        settings: AggregatorSettings,
    ) -> Self {
        Self::new(build_sources(http, cache, endpoints), settings)
    }

    pub fn settings(&self) -> AggregatorSettings {
        self.settings
    }

    /// Look `word` up in every enabled source
    ///
    /// An `external` record is registered under its own source, always becomes
    /// the primary, and suppresses the connector for that source.
    pub async fn aggregate(
        &self,
        word: &str,
        enabled: &[SourceId],
        external: Option<CanonicalRecord>,
    ) -> AggregateResult {
        let started = Instant::now();
        let external_source = external.as_ref().map(|record| record.source);

        let mut sources = BTreeMap::new();
        if let Some(record) = external {
            sources.insert(record.source, record);
        }

        let selected: Vec<Arc<dyn DictionarySource>> = self
            .sources
            .iter()
            .filter(|s| enabled.contains(&s.source_id()) && Some(s.source_id()) != external_source)
            .cloned()
            .collect();

        for (source, record) in self.fetch_all(word, selected).await {
            sources.insert(source, record);
        }

        let Some(primary_source) = select_primary(&sources, external_source) else {
            info!(
                word = %word,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Word not found in any source"
            );
            return AggregateResult::not_found();
        };

        let mut primary = sources[&primary_source].clone();
        enrich_phonetic(&mut primary, primary_source, &sources);
        primary.example = merge_in_priority_order(&sources);

        info!(
            word = %word,
            primary = %primary_source,
            found = sources.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Aggregate lookup completed"
        );

        AggregateResult {
            primary: Some(primary),
            sources,
        }
    }

    async fn fetch_all(
        &self,
        word: &str,
        selected: Vec<Arc<dyn DictionarySource>>,
    ) -> Vec<(SourceId, CanonicalRecord)> {
        let cancel = CancellationToken::new();
        // Also cancels in-flight work if the caller drops this future
        let _guard = cancel.clone().drop_guard();

        let owned_word: Arc<str> = Arc::from(word);
        let permits = Arc::new(Semaphore::new(self.settings.max_concurrency.max(1)));

        // Dropping the set aborts whatever is still running
        let mut pending = JoinSet::new();
        for source in selected {
            let word = Arc::clone(&owned_word);
            let cancel = cancel.clone();
            let permits = Arc::clone(&permits);
            pending.spawn(async move {
                let source_id = source.source_id();
                let started = Instant::now();
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => source.fetch(&word, &cancel).await,
                    Err(_) => Err(ConnectorError::Cancelled),
                };
                (source_id, result, started.elapsed())
            });
        }

        let deadline = tokio::time::sleep(self.settings.deadline);
        tokio::pin!(deadline);

        let mut found = Vec::new();
        loop {
            tokio::select! {
                next = pending.join_next() => match next {
                    Some(Ok((source, result, elapsed))) => {
                        if let Some(record) = log_outcome(word, source, result, elapsed) {
                            found.push((source, record));
                        }
                    }
                    Some(Err(e)) => {
                        error!(word = %word, error = %e, "Source task failed");
                    }
                    None => break,
                },
                _ = &mut deadline => {
                    warn!(
                        word = %word,
                        deadline_ms = self.settings.deadline.as_millis() as u64,
                        outstanding = pending.len(),
                        "Aggregate deadline reached, cancelling outstanding sources"
                    );
                    cancel.cancel();
                    pending.abort_all();
                    break;
                }
            }
        }

        found
    }
}

fn log_outcome(
    word: &str,
    source: SourceId,
    result: FetchResult,
    elapsed: Duration,
) -> Option<CanonicalRecord> {
    let elapsed_ms = elapsed.as_millis() as u64;
    match result {
        Ok(Some(record)) => {
            debug!(word = %word, source = %source, elapsed_ms, "Source returned a record");
            Some(record)
        }
        Ok(None) => {
            debug!(word = %word, source = %source, elapsed_ms, "Word not found in source");
            None
        }
        Err(e) => {
            warn!(word = %word, source = %source, elapsed_ms, error = %e, "Source lookup failed");
            None
        }
    }
}

/// External record first, then primary priority, then any present source
pub fn select_primary(
    sources: &BTreeMap<SourceId, CanonicalRecord>,
    external: Option<SourceId>,
) -> Option<SourceId> {
    external
        .filter(|id| sources.contains_key(id))
        .or_else(|| {
            SourceId::PRIMARY_PRIORITY
                .into_iter()
                .find(|id| sources.contains_key(id))
        })
        .or_else(|| SourceId::MERGE_ORDER.into_iter().find(|id| sources.contains_key(id)))
}

/// Take a strictly longer, non-empty phonetic from other sources in phonetic priority
pub fn enrich_phonetic(
    primary: &mut CanonicalRecord,
    primary_source: SourceId,
    sources: &BTreeMap<SourceId, CanonicalRecord>,
) {
    for donor_source in SourceId::PHONETIC_PRIORITY {
        if donor_source == primary_source {
            continue;
        }
        let Some(donor) = sources.get(&donor_source) else {
            continue;
        };
        if !donor.phonetic.is_empty()
            && donor.phonetic.chars().count() > primary.phonetic.chars().count()
        {
            primary.phonetic = donor.phonetic.clone();
        }
    }
}
