//! Durable cache table operations
//!
//! Rows are keyed by (lower-cased word, source id). `created_at` is unix
//! milliseconds. Payloads are stored as JSON text; decoding is the caller's job.

use sqlx::{Pool, Sqlite};
use vocab_common::{Error, Result};

/// Raw durable cache row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DictCacheRow {
    pub data: String,
    pub created_at: i64,
}

/// Fetch the row for (word, source), if any
pub async fn get_entry(db: &Pool<Sqlite>, word: &str, source: &str) -> Result<Option<DictCacheRow>> {
    sqlx::query_as::<_, DictCacheRow>(
        "SELECT data, created_at FROM dict_cache WHERE word = ? AND source = ?",
    )
    .bind(word)
    .bind(source)
    .fetch_optional(db)
    .await
    .map_err(Error::Database)
}

/// Insert or replace the row for (word, source)
pub async fn put_entry(
    db: &Pool<Sqlite>,
    word: &str,
    source: &str,
    data: &str,
    created_at: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO dict_cache (word, source, data, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(word)
    .bind(source)
    .bind(data)
    .bind(created_at)
    .execute(db)
    .await?;

    Ok(())
}

/// Delete the row for (word, source)
pub async fn delete_entry(db: &Pool<Sqlite>, word: &str, source: &str) -> Result<()> {
    sqlx::query("DELETE FROM dict_cache WHERE word = ? AND source = ?")
        .bind(word)
        .bind(source)
        .execute(db)
        .await?;

    Ok(())
}

/// Delete rows created before `cutoff` (unix ms); returns rows removed
pub async fn delete_created_before(db: &Pool<Sqlite>, cutoff: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM dict_cache WHERE created_at < ?")
        .bind(cutoff)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}

/// Delete every row; returns rows removed
pub async fn delete_all(db: &Pool<Sqlite>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM dict_cache").execute(db).await?;
    Ok(result.rows_affected())
}

/// Total row count
pub async fn count_all(db: &Pool<Sqlite>) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dict_cache")
        .fetch_one(db)
        .await?;
    Ok(total)
}

/// Row count per source id
pub async fn count_by_source(db: &Pool<Sqlite>) -> Result<Vec<(String, i64)>> {
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT source, COUNT(*) FROM dict_cache GROUP BY source ORDER BY source")
            .fetch_all(db)
            .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_pool;

    #[tokio::test]
    async fn test_put_then_get() {
        let db = init_memory_pool().await.unwrap();

        put_entry(&db, "big", "bing", "{}", 1_000).await.unwrap();
        let row = get_entry(&db, "big", "bing").await.unwrap();

        assert_eq!(
            row,
            Some(DictCacheRow {
                data: "{}".to_string(),
                created_at: 1_000
            })
        );
        assert!(get_entry(&db, "big", "cambridge").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_existing_row() {
        let db = init_memory_pool().await.unwrap();

        put_entry(&db, "big", "bing", "first", 1_000).await.unwrap();
        put_entry(&db, "big", "bing", "second", 2_000).await.unwrap();

        assert_eq!(count_all(&db).await.unwrap(), 1);
        let row = get_entry(&db, "big", "bing").await.unwrap().unwrap();
        assert_eq!(row.data, "second");
        assert_eq!(row.created_at, 2_000);
    }

    #[tokio::test]
    async fn test_delete_created_before() {
        let db = init_memory_pool().await.unwrap();

        put_entry(&db, "old", "bing", "{}", 100).await.unwrap();
        put_entry(&db, "new", "bing", "{}", 500).await.unwrap();

        let removed = delete_created_before(&db, 200).await.unwrap();

        assert_eq!(removed, 1);
        assert!(get_entry(&db, "old", "bing").await.unwrap().is_none());
        assert!(get_entry(&db, "new", "bing").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_count_by_source_and_delete_all() {
        let db = init_memory_pool().await.unwrap();

        put_entry(&db, "a", "bing", "{}", 1).await.unwrap();
        put_entry(&db, "b", "bing", "{}", 1).await.unwrap();
        put_entry(&db, "a", "freedict", "{}", 1).await.unwrap();

        let by_source = count_by_source(&db).await.unwrap();
        assert_eq!(
            by_source,
            vec![("bing".to_string(), 2), ("freedict".to_string(), 1)]
        );

        assert_eq!(delete_all(&db).await.unwrap(), 3);
        assert_eq!(count_all(&db).await.unwrap(), 0);
    }
}
