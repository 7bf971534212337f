//! Database operations for `taxonomy_mappings` and `alias_groups`.
//!
//! Taxonomy mappings are exact (vendor, raw value) → canonical entity rows
//! for brands and categories. Rows are get-or-created the first time a raw
//! value is sighted; a NULL canonical target means the row is awaiting
//! curation, which is the expected steady state for new values, not an
//! error. Curation itself happens in an external surface — this crate only
//! reads (and creates placeholder) rows.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Discriminator for exact mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKind {
    Brand,
    Category,
}

impl MappingKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MappingKind::Brand => "brand",
            MappingKind::Category => "category",
        }
    }
}

/// Discriminator for alias groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    Gender,
    Color,
    Pattern,
}

impl AliasKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AliasKind::Gender => "gender",
            AliasKind::Color => "color",
            AliasKind::Pattern => "pattern",
        }
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `taxonomy_mappings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaxonomyMappingRow {
    pub id: i64,
    pub kind: String,
    pub vendor_id: i64,
    pub raw_value: String,
    pub canonical_name: Option<String>,
    pub canonical_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaxonomyMappingRow {
    /// A mapping is curated once an operator has set its canonical target.
    #[must_use]
    pub fn is_curated(&self) -> bool {
        self.canonical_name.is_some()
    }
}

/// A row from the `alias_groups` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AliasGroupRow {
    pub id: i64,
    pub kind: String,
    pub canonical_key: String,
    pub aliases: Vec<String>,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const MAPPING_COLUMNS: &str =
    "id, kind, vendor_id, raw_value, canonical_name, canonical_id, created_at, updated_at";

const ALIAS_COLUMNS: &str = "id, kind, canonical_key, aliases, priority, created_at, updated_at";

// ---------------------------------------------------------------------------
// taxonomy_mappings operations
// ---------------------------------------------------------------------------

/// Atomically gets-or-creates the mapping row for `(kind, vendor_id,
/// raw_value)`.
///
/// The conflict branch performs a no-op update so the row is returned either
/// way without a second round trip.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn get_or_create_mapping(
    pool: &PgPool,
    kind: MappingKind,
    vendor_id: i64,
    raw_value: &str,
) -> Result<TaxonomyMappingRow, DbError> {
    let row = sqlx::query_as::<_, TaxonomyMappingRow>(&format!(
        "INSERT INTO taxonomy_mappings (kind, vendor_id, raw_value) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (kind, vendor_id, raw_value) DO UPDATE SET raw_value = EXCLUDED.raw_value \
         RETURNING {MAPPING_COLUMNS}"
    ))
    .bind(kind.as_str())
    .bind(vendor_id)
    .bind(raw_value)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Sets the canonical target of a mapping row. Exposed for seeding and
/// tests; production curation goes through the external surface.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the row does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn curate_mapping(
    pool: &PgPool,
    id: i64,
    canonical_name: &str,
    canonical_id: Option<i64>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE taxonomy_mappings \
         SET canonical_name = $2, canonical_id = $3, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(canonical_name)
    .bind(canonical_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Lists uncurated mapping rows — the operator-facing curation backlog.
/// Optional filters narrow by kind and vendor.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_unmapped_mappings(
    pool: &PgPool,
    kind: Option<MappingKind>,
    vendor_id: Option<i64>,
) -> Result<Vec<TaxonomyMappingRow>, DbError> {
    let rows = sqlx::query_as::<_, TaxonomyMappingRow>(&format!(
        "SELECT {MAPPING_COLUMNS} FROM taxonomy_mappings \
         WHERE canonical_name IS NULL \
           AND ($1::text IS NULL OR kind = $1) \
           AND ($2::bigint IS NULL OR vendor_id = $2) \
         ORDER BY kind, vendor_id, raw_value"
    ))
    .bind(kind.map(MappingKind::as_str))
    .bind(vendor_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// alias_groups operations
// ---------------------------------------------------------------------------

/// Returns all alias groups of `kind` in `(priority, id)` order — the
/// deterministic match order used by the compiled matchers.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_alias_groups(pool: &PgPool, kind: AliasKind) -> Result<Vec<AliasGroupRow>, DbError> {
    let rows = sqlx::query_as::<_, AliasGroupRow>(&format!(
        "SELECT {ALIAS_COLUMNS} FROM alias_groups WHERE kind = $1 ORDER BY priority, id"
    ))
    .bind(kind.as_str())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Upserts one alias group keyed by `(kind, canonical_key)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_alias_group(
    pool: &PgPool,
    kind: AliasKind,
    canonical_key: &str,
    aliases: &[String],
    priority: i32,
) -> Result<AliasGroupRow, DbError> {
    let row = sqlx::query_as::<_, AliasGroupRow>(&format!(
        "INSERT INTO alias_groups (kind, canonical_key, aliases, priority) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (kind, canonical_key) DO UPDATE SET \
             aliases    = EXCLUDED.aliases, \
             priority   = EXCLUDED.priority, \
             updated_at = NOW() \
         RETURNING {ALIAS_COLUMNS}"
    ))
    .bind(kind.as_str())
    .bind(canonical_key)
    .bind(aliases)
    .bind(priority)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
