//! Database access for vocab-dict
//!
//! The service owns a single table, `dict_cache`, which is the durable
//! cache tier.

pub mod dict_cache;

use sqlx::SqlitePool;
use std::path::Path;
use vocab_common::Result;

/// Open the database file and create vocab-dict tables
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    let pool = vocab_common::db::init_database(db_path).await?;
    init_tables(&pool).await?;
    Ok(pool)
}

/// In-memory database with vocab-dict tables (tests, ephemeral runs)
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let pool = vocab_common::db::init_memory_database().await?;
    init_tables(&pool).await?;
    Ok(pool)
}

/// Create vocab-dict tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dict_cache (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            word TEXT NOT NULL,
            source TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(word, source)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_dict_cache_word ON dict_cache(word)")
        .execute(pool)
        .await?;

    // Purge queries filter on age
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_dict_cache_created ON dict_cache(created_at)")
        .execute(pool)
        .await?;

    tracing::info!("Database tables initialized (dict_cache)");

    Ok(())
}
