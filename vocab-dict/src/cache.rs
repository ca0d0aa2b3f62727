//! Two-tier dictionary cache
//!
//! - Fast tier: in-process map, short TTL (default 30 min)
//! - Durable tier: SQLite `dict_cache` table, long TTL (default 24 h)
//!
//! `get` checks the fast tier, then the durable tier; a durable hit is copied
//! back into the fast tier. The copy keeps the durable row's write time, so it
//! never outlives the durable TTL or a purge of that row. `set` writes both
//! tiers, replacing any existing entry (last writer wins). Expiry is evaluated
//! on read, and expired fast entries are swept on each fast tier insert.
//! Words are lower-cased here so callers never normalize.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use vocab_common::Clock;

use crate::db::dict_cache;
use crate::models::{CanonicalRecord, SourceId};

/// Default fast tier TTL (30 minutes)
pub const DEFAULT_FAST_TTL: Duration = Duration::from_secs(1800);

/// Default durable tier TTL (24 hours)
pub const DEFAULT_DURABLE_TTL: Duration = Duration::from_secs(86400);

/// Cache errors
///
/// Callers treat these as "cache unavailable": a failed read is a miss and a
/// failed write is skipped.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Durable tier read/write failed
    #[error("Cache unavailable: {0}")]
    Unavailable(#[from] vocab_common::Error),

    /// Payload could not be encoded or decoded
    #[error("Cache payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Per-tier expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
    pub fast: Duration,
    pub durable: Duration,
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self {
            fast: DEFAULT_FAST_TTL,
            durable: DEFAULT_DURABLE_TTL,
        }
    }
}

/// Cache key: lower-cased word plus source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub word: String,
    pub source: SourceId,
}

impl CacheKey {
    pub fn new(word: &str, source: SourceId) -> Self {
        Self {
            word: word.trim().to_lowercase(),
            source,
        }
    }
}

/// One cached record
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub word: String,
    pub source: SourceId,
    pub payload: CanonicalRecord,
    /// When this entry entered the fast tier
    pub created_at: DateTime<Utc>,
    /// When the record was originally written (durable row `created_at`)
    pub origin_created_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>, ttl: &CacheTtl) -> bool {
        is_expired(self.created_at, now, ttl.fast)
            || is_expired(self.origin_created_at, now, ttl.durable)
    }
}

/// Durable tier statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total: i64,
    pub by_source: BTreeMap<String, i64>,
}

/// Two-tier cache store
///
/// Constructed once at startup and shared (`Arc`) by the aggregator and all
/// connectors.
pub struct CacheStore {
    db: SqlitePool,
    fast: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: CacheTtl,
    clock: Arc<dyn Clock>,
}

fn millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    (now - created_at).num_milliseconds() >= millis(ttl)
}

impl CacheStore {
    pub fn new(db: SqlitePool, ttl: CacheTtl, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            fast: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> CacheTtl {
        self.ttl
    }

    /// Look up a cached record
    ///
    /// Durable tier failures are logged and reported as a miss.
    pub async fn get(&self, word: &str, source: SourceId) -> Option<CanonicalRecord> {
        let key = CacheKey::new(word, source);
        let now = self.clock.now();

        if let Some(record) = self.fast_get(&key, now).await {
            debug!(word = %key.word, source = %source, "Fast tier cache hit");
            return Some(record);
        }

        match self.durable_get(&key, now).await {
            Ok(Some((record, origin))) => {
                debug!(word = %key.word, source = %source, "Durable tier cache hit, back-filling fast tier");
                self.fast_put(key, record.clone(), now, origin).await;
                Some(record)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(word = %key.word, source = %source, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store a record in both tiers
    ///
    /// The fast tier write always happens; an error means the durable write
    /// was skipped.
    pub async fn set(
        &self,
        word: &str,
        source: SourceId,
        record: &CanonicalRecord,
    ) -> Result<(), CacheError> {
        let key = CacheKey::new(word, source);
        let now = self.clock.now();

        self.fast_put(key.clone(), record.clone(), now, now).await;

        let data = serde_json::to_string(record)?;
        dict_cache::put_entry(&self.db, &key.word, source.as_str(), &data, now.timestamp_millis())
            .await?;

        Ok(())
    }

    /// Delete durable entries older than `age`; returns durable rows removed
    ///
    /// Fast tier entries whose original write is older than `age` are dropped
    /// as well, including back-filled copies.
    pub async fn purge_older_than(&self, age: Duration) -> Result<u64, CacheError> {
        let cutoff = self.clock.now().timestamp_millis().saturating_sub(millis(age));

        self.fast
            .write()
            .await
            .retain(|_, entry| entry.origin_created_at.timestamp_millis() >= cutoff);

        let removed = dict_cache::delete_created_before(&self.db, cutoff).await?;
        debug!(removed, age_secs = age.as_secs(), "Purged durable cache entries");
        Ok(removed)
    }

    /// Remove every entry; returns durable rows removed
    pub async fn clear_all(&self) -> Result<u64, CacheError> {
        self.fast.write().await.clear();
        let removed = dict_cache::delete_all(&self.db).await?;
        debug!(removed, "Cleared durable cache");
        Ok(removed)
    }

    /// Durable tier counts
    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        let total = dict_cache::count_all(&self.db).await?;
        let by_source = dict_cache::count_by_source(&self.db)
            .await?
            .into_iter()
            .collect();
        Ok(CacheStats { total, by_source })
    }

    /// Number of entries currently held in the fast tier
    pub async fn fast_len(&self) -> usize {
        self.fast.read().await.len()
    }

    async fn fast_get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<CanonicalRecord> {
        {
            let fast = self.fast.read().await;
            match fast.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now, &self.ttl) => {
                    return Some(entry.payload.clone());
                }
                Some(_) => {}
            }
        }

        // Lazy eviction; re-check since another writer may have refreshed it
        let mut fast = self.fast.write().await;
        if let Some(entry) = fast.get(key) {
            if entry.is_expired(now, &self.ttl) {
                fast.remove(key);
                debug!(word = %key.word, source = %key.source, "Evicted expired fast tier entry");
            }
        }
        None
    }

    async fn fast_put(
        &self,
        key: CacheKey,
        record: CanonicalRecord,
        now: DateTime<Utc>,
        origin_created_at: DateTime<Utc>,
    ) {
        let entry = CacheEntry {
            word: key.word.clone(),
            source: key.source,
            payload: record,
            created_at: now,
            origin_created_at,
        };

        let mut fast = self.fast.write().await;
        let before = fast.len();
        fast.retain(|_, existing| !existing.is_expired(now, &self.ttl));
        let swept = before - fast.len();
        if swept > 0 {
            debug!(swept, "Swept expired fast tier entries");
        }
        fast.insert(key, entry);
    }

    async fn durable_get(
        &self,
        key: &CacheKey,
        now: DateTime<Utc>,
    ) -> Result<Option<(CanonicalRecord, DateTime<Utc>)>, CacheError> {
        let source = key.source.as_str();
        let Some(row) = dict_cache::get_entry(&self.db, &key.word, source).await? else {
            return Ok(None);
        };

        let age_ms = now.timestamp_millis().saturating_sub(row.created_at);
        if age_ms >= millis(self.ttl.durable) {
            dict_cache::delete_entry(&self.db, &key.word, source).await?;
            debug!(word = %key.word, source = %key.source, "Deleted expired durable tier entry");
            return Ok(None);
        }

        let record = serde_json::from_str(&row.data)?;
        let origin = DateTime::from_timestamp_millis(row.created_at).unwrap_or(now);
        Ok(Some((record, origin)))
    }
}
