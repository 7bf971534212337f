//! Database operations for the `import_records` table.
//!
//! One row per (vendor, item key). The four processing layers live in JSONB
//! columns sharing the [`ItemFields`] shape. The pipeline never deletes a
//! row; vendors that stop reporting an item get `is_dropped = true`, and a
//! separate retention purge removes long-dropped rows.

use chrono::{DateTime, Utc};
use modfeed_core::ItemFields;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `import_records` table.
///
/// The `final` column is aliased to `final_layer` in every SELECT because
/// `final` is awkward as a Rust field name. The contract on that column:
/// it is only ever fully overwritten by a successful validation, never
/// merged field-by-field.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImportRecordRow {
    pub id: i64,
    pub public_id: Uuid,
    pub vendor_id: i64,
    pub item_key: String,
    pub scraped: Json<ItemFields>,
    pub parsed: Option<Json<ItemFields>>,
    pub manual: Option<Json<ItemFields>>,
    pub final_layer: Option<Json<ItemFields>>,
    pub is_dropped: bool,
    pub is_validated: bool,
    pub is_released: bool,
    pub catalog_product_id: Option<i64>,
    pub brand_mapping_id: Option<i64>,
    pub category_mapping_id: Option<i64>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub checked_at: Option<DateTime<Utc>>,
    pub parsed_date: Option<DateTime<Utc>>,
    pub imported_date: Option<DateTime<Utc>>,
}

const RECORD_COLUMNS: &str = "id, public_id, vendor_id, item_key, scraped, parsed, manual, \
                              final AS final_layer, is_dropped, is_validated, is_released, \
                              catalog_product_id, brand_mapping_id, category_mapping_id, \
                              created, modified, checked_at, parsed_date, imported_date";

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Atomically gets-or-creates the record for `(vendor_id, item_key)` and
/// stores a fresh scraped layer.
///
/// Re-sighting a previously dropped item clears `is_dropped`. `modified` is
/// advanced; the other layers and flags are left untouched. Takes any
/// executor so the ingest pipeline can run it inside the transaction that
/// also records the change-cache hash.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_scraped<'e, E>(
    executor: E,
    vendor_id: i64,
    item_key: &str,
    scraped: &ItemFields,
) -> Result<ImportRecordRow, DbError>
where
    E: sqlx::PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, ImportRecordRow>(&format!(
        "INSERT INTO import_records (vendor_id, item_key, scraped) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (vendor_id, item_key) DO UPDATE SET \
             scraped    = EXCLUDED.scraped, \
             is_dropped = FALSE, \
             modified   = NOW(), \
             checked_at = NOW() \
         RETURNING {RECORD_COLUMNS}"
    ))
    .bind(vendor_id)
    .bind(item_key)
    .bind(Json(scraped))
    .fetch_one(executor)
    .await?;
    Ok(row)
}

/// Fetches one record by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails (including when a stored
/// layer does not decode as [`ItemFields`] — callers treat that as a
/// skippable per-record failure).
pub async fn get_record(pool: &PgPool, id: i64) -> Result<Option<ImportRecordRow>, DbError> {
    let row = sqlx::query_as::<_, ImportRecordRow>(&format!(
        "SELECT {RECORD_COLUMNS} FROM import_records WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Refreshes `checked_at` for an unchanged sighting. This is the only write
/// performed when the change cache reports an identical payload.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn touch_checked(pool: &PgPool, vendor_id: i64, item_key: &str) -> Result<(), DbError> {
    sqlx::query("UPDATE import_records SET checked_at = NOW() WHERE vendor_id = $1 AND item_key = $2")
        .bind(vendor_id)
        .bind(item_key)
        .execute(pool)
        .await?;
    Ok(())
}

/// Records the outcome of a parse run.
///
/// Always stores the parsed layer, `parsed_date`, and the back-references to
/// the mapping rows that were applied. On `validated = true` the final layer
/// is fully replaced by the parsed layer; on `false` the final layer is left
/// untouched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn record_parse_outcome(
    pool: &PgPool,
    id: i64,
    parsed: &ItemFields,
    validated: bool,
    brand_mapping_id: Option<i64>,
    category_mapping_id: Option<i64>,
) -> Result<(), DbError> {
    if validated {
        sqlx::query(
            "UPDATE import_records SET \
                 parsed = $2, final = $2, is_validated = TRUE, \
                 brand_mapping_id = $3, category_mapping_id = $4, \
                 parsed_date = NOW(), modified = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(Json(parsed))
        .bind(brand_mapping_id)
        .bind(category_mapping_id)
        .execute(pool)
        .await?;
    } else {
        sqlx::query(
            "UPDATE import_records SET \
                 parsed = $2, is_validated = FALSE, \
                 brand_mapping_id = $3, category_mapping_id = $4, \
                 parsed_date = NOW(), modified = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(Json(parsed))
        .bind(brand_mapping_id)
        .bind(category_mapping_id)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Marks every record of `vendor_id` that is not in `seen_keys` as dropped,
/// returning the ids that changed state so the caller can enqueue one more
/// parse/import cycle for each (which hides the catalog entry downstream).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn mark_dropped_missing(
    pool: &PgPool,
    vendor_id: i64,
    seen_keys: &[String],
) -> Result<Vec<i64>, DbError> {
    let ids: Vec<i64> = sqlx::query_scalar(
        "UPDATE import_records \
         SET is_dropped = TRUE, modified = NOW() \
         WHERE vendor_id = $1 AND is_dropped = FALSE AND NOT (item_key = ANY($2)) \
         RETURNING id",
    )
    .bind(vendor_id)
    .bind(seen_keys)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Stores the forward link to the catalog product a record reconciled to.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn set_forward_link(pool: &PgPool, id: i64, product_id: i64) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE import_records SET catalog_product_id = $2, modified = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(product_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Marks a record as imported and released.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn mark_imported(pool: &PgPool, id: i64) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE import_records \
         SET imported_date = NOW(), is_released = TRUE, modified = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Advances `modified` without changing anything else. Called when a
/// consumer hits an unrecoverable per-record error, so a permanently broken
/// record does not hot-loop at the front of every run.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn advance_modified(pool: &PgPool, id: i64) -> Result<(), DbError> {
    sqlx::query("UPDATE import_records SET modified = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Retention purge: deletes dropped records whose `modified` is older than
/// `older_than_days`. Returns the number of rows deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn purge_dropped_records(pool: &PgPool, older_than_days: i64) -> Result<u64, DbError> {
    let result = sqlx::query(
        "DELETE FROM import_records \
         WHERE is_dropped = TRUE AND modified < NOW() - ($1 * INTERVAL '1 day')",
    )
    .bind(older_than_days)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
