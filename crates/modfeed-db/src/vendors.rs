//! Database operations for the `vendors` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `vendors` table.
///
/// `catalog_vendor_id` stays `NULL` until an operator wires the feed source
/// to its canonical catalog vendor; records from an unwired vendor can be
/// ingested and parsed but will always fail validation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VendorRow {
    pub id: i64,
    pub public_id: Uuid,
    pub slug: String,
    pub name: String,
    pub affiliate_network: Option<String>,
    pub affiliate_id: Option<String>,
    pub catalog_vendor_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const VENDOR_COLUMNS: &str = "id, public_id, slug, name, affiliate_network, affiliate_id, \
                              catalog_vendor_id, is_active, created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns a vendor by slug, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_vendor_by_slug(pool: &PgPool, slug: &str) -> Result<Option<VendorRow>, DbError> {
    let row = sqlx::query_as::<_, VendorRow>(&format!(
        "SELECT {VENDOR_COLUMNS} FROM vendors WHERE slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Returns a vendor by internal id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_vendor(pool: &PgPool, id: i64) -> Result<Option<VendorRow>, DbError> {
    let row = sqlx::query_as::<_, VendorRow>(&format!(
        "SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Wires a vendor to its canonical catalog vendor.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the vendor does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn link_catalog_vendor(
    pool: &PgPool,
    vendor_id: i64,
    catalog_vendor_id: i64,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE vendors SET catalog_vendor_id = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(vendor_id)
    .bind(catalog_vendor_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
