//! Shared test utilities for vocab-dict integration tests

#![allow(dead_code)]

pub mod fixture_server;
pub mod mock_source;

use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;
use vocab_common::ManualClock;
use vocab_dict::{CacheStore, CacheTtl};

/// Temporary on-disk database with vocab-dict tables
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("vocab.db");
    let pool = vocab_dict::db::init_database_pool(&db_path).await?;
    Ok((temp_dir, pool))
}

/// Cache over an in-memory database driven by a manual clock
pub async fn memory_cache() -> Result<(Arc<CacheStore>, Arc<ManualClock>)> {
    let pool = vocab_dict::db::init_memory_pool().await?;
    let clock = Arc::new(ManualClock::default());
    let cache = Arc::new(CacheStore::new(pool, CacheTtl::default(), clock.clone()));
    Ok((cache, clock))
}
