//! Database operations for the `change_cache` table.
//!
//! Per-(vendor, key) memo of the content hash of the last *stored* scraped
//! payload. Ingest consults it to skip redundant parse work; an identical
//! hash only refreshes the `seen_at` timestamp. Detection and recording are
//! separate steps: [`detect_change`] never writes the hash, and
//! [`record_content_hash`] is called in the same transaction that stores
//! the payload, so the cache can never claim a payload that was lost.

use sqlx::PgPool;

use crate::DbError;

/// Result of comparing an incoming payload hash against the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Hash matches the cached entry; only `seen_at` was refreshed.
    Unchanged,
    /// Hash differs, the entry was absent, or the entry had expired. The
    /// caller stores the payload and records the new hash alongside it.
    Changed,
}

/// Compares `content_hash` against the cached entry for `(vendor_id,
/// item_key)`. On a match only `seen_at` is refreshed; the hash itself is
/// never written here, so a `Changed` verdict stands until
/// [`record_content_hash`] commits with the stored payload.
///
/// An expired entry is treated as absent, so a stale record is re-processed
/// at least once every TTL period even if its payload never changes.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn detect_change(
    pool: &PgPool,
    vendor_id: i64,
    item_key: &str,
    content_hash: &str,
) -> Result<ChangeOutcome, DbError> {
    let existing: Option<String> = sqlx::query_scalar(
        "SELECT content_hash FROM change_cache \
         WHERE vendor_id = $1 AND item_key = $2 AND expires_at > NOW()",
    )
    .bind(vendor_id)
    .bind(item_key)
    .fetch_optional(pool)
    .await?;

    if existing.as_deref() == Some(content_hash) {
        sqlx::query(
            "UPDATE change_cache SET seen_at = NOW() WHERE vendor_id = $1 AND item_key = $2",
        )
        .bind(vendor_id)
        .bind(item_key)
        .execute(pool)
        .await?;
        return Ok(ChangeOutcome::Unchanged);
    }

    Ok(ChangeOutcome::Changed)
}

/// Writes the hash of a just-stored payload into the cache. Must run in the
/// same transaction as the payload upsert, so a failed store leaves the old
/// entry in place and the item is re-processed on the next sighting.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn record_content_hash<'e, E>(
    executor: E,
    vendor_id: i64,
    item_key: &str,
    content_hash: &str,
    ttl_days: i64,
) -> Result<(), DbError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO change_cache (vendor_id, item_key, content_hash, seen_at, expires_at) \
         VALUES ($1, $2, $3, NOW(), NOW() + ($4 * INTERVAL '1 day')) \
         ON CONFLICT (vendor_id, item_key) DO UPDATE SET \
             content_hash = EXCLUDED.content_hash, \
             seen_at      = NOW(), \
             expires_at   = EXCLUDED.expires_at",
    )
    .bind(vendor_id)
    .bind(item_key)
    .bind(content_hash)
    .bind(ttl_days)
    .execute(executor)
    .await?;
    Ok(())
}

/// Deletes expired cache entries. Returns the number of rows removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn evict_expired_cache_entries(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM change_cache WHERE expires_at <= NOW()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
