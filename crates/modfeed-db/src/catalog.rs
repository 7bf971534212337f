//! Database operations for the storefront catalog tables.
//!
//! This is the catalog-store surface the importer writes through:
//! create, update-by-natural-key, and find-by-slug on products, one
//! price/availability offer row per (product, vendor), and add-if-absent
//! option attachments. The pipeline never deletes a catalog row — rejection
//! only hides it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `catalog_products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogProductRow {
    pub id: i64,
    pub public_id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub brand_id: Option<i64>,
    pub category_id: Option<i64>,
    pub gender: Option<String>,
    pub image_path: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `catalog_offers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogOfferRow {
    pub id: i64,
    pub product_id: i64,
    pub vendor_id: i64,
    pub buy_url: String,
    pub regular_price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub currency: Option<String>,
    /// Units in stock; -1 means in stock with unknown count, 0 unavailable.
    pub availability: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field set written when creating or overwriting a catalog product.
#[derive(Debug, Clone)]
pub struct NewProduct<'a> {
    pub slug: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub brand_id: Option<i64>,
    pub category_id: Option<i64>,
    pub gender: Option<&'a str>,
    pub image_path: Option<&'a str>,
    pub is_available: bool,
}

const PRODUCT_COLUMNS: &str = "id, public_id, slug, name, description, brand_id, category_id, \
                               gender, image_path, is_available, created_at, updated_at";

const OFFER_COLUMNS: &str = "id, product_id, vendor_id, buy_url, regular_price, discount_price, \
                             currency, availability, created_at, updated_at";

// ---------------------------------------------------------------------------
// Brands / categories / vendors
// ---------------------------------------------------------------------------

/// Gets-or-creates a catalog brand by name, returning its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn get_or_create_brand(pool: &PgPool, name: &str) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO catalog_brands (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Gets-or-creates a catalog category by name, returning its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn get_or_create_category(pool: &PgPool, name: &str) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO catalog_categories (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Gets-or-creates a catalog vendor by name, returning its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn get_or_create_vendor(pool: &PgPool, name: &str) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO catalog_vendors (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Fetches a product by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &PgPool, id: i64) -> Result<Option<CatalogProductRow>, DbError> {
    let row = sqlx::query_as::<_, CatalogProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM catalog_products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetches a product by slug.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_product_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<CatalogProductRow>, DbError> {
    let row = sqlx::query_as::<_, CatalogProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM catalog_products WHERE slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Creates a product, or overwrites its fields in place when the slug
/// already exists. Replaying the same write is a no-op beyond the first
/// application.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_product_by_slug(
    pool: &PgPool,
    product: &NewProduct<'_>,
) -> Result<CatalogProductRow, DbError> {
    let row = sqlx::query_as::<_, CatalogProductRow>(&format!(
        "INSERT INTO catalog_products \
             (slug, name, description, brand_id, category_id, gender, image_path, is_available) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (slug) DO UPDATE SET \
             name         = EXCLUDED.name, \
             description  = EXCLUDED.description, \
             brand_id     = EXCLUDED.brand_id, \
             category_id  = EXCLUDED.category_id, \
             gender       = EXCLUDED.gender, \
             image_path   = EXCLUDED.image_path, \
             is_available = EXCLUDED.is_available, \
             updated_at   = NOW() \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(product.slug)
    .bind(product.name)
    .bind(product.description)
    .bind(product.brand_id)
    .bind(product.category_id)
    .bind(product.gender)
    .bind(product.image_path)
    .bind(product.is_available)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Overwrites an existing product's importable fields in place, keeping its
/// slug. Used when reconciliation matched by forward link.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the product does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_product(
    pool: &PgPool,
    id: i64,
    product: &NewProduct<'_>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE catalog_products SET \
             name = $2, description = $3, brand_id = $4, category_id = $5, \
             gender = $6, image_path = $7, is_available = $8, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(product.name)
    .bind(product.description)
    .bind(product.brand_id)
    .bind(product.category_id)
    .bind(product.gender)
    .bind(product.image_path)
    .bind(product.is_available)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Hides a product: availability goes false and every associated offer's
/// availability is forced to 0. The rows themselves are never deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either update fails.
pub async fn hide_product(pool: &PgPool, product_id: i64) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE catalog_products SET is_available = FALSE, updated_at = NOW() WHERE id = $1",
    )
    .bind(product_id)
    .execute(pool)
    .await?;

    sqlx::query("UPDATE catalog_offers SET availability = 0, updated_at = NOW() WHERE product_id = $1")
        .bind(product_id)
        .execute(pool)
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Offers
// ---------------------------------------------------------------------------

/// Upserts the (product, vendor) offer row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
#[allow(clippy::too_many_arguments)]
pub async fn upsert_offer(
    pool: &PgPool,
    product_id: i64,
    vendor_id: i64,
    buy_url: &str,
    regular_price: Option<Decimal>,
    discount_price: Option<Decimal>,
    currency: Option<&str>,
    availability: i32,
) -> Result<CatalogOfferRow, DbError> {
    let row = sqlx::query_as::<_, CatalogOfferRow>(&format!(
        "INSERT INTO catalog_offers \
             (product_id, vendor_id, buy_url, regular_price, discount_price, currency, availability) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (product_id, vendor_id) DO UPDATE SET \
             buy_url        = EXCLUDED.buy_url, \
             regular_price  = EXCLUDED.regular_price, \
             discount_price = EXCLUDED.discount_price, \
             currency       = EXCLUDED.currency, \
             availability   = EXCLUDED.availability, \
             updated_at     = NOW() \
         RETURNING {OFFER_COLUMNS}"
    ))
    .bind(product_id)
    .bind(vendor_id)
    .bind(buy_url)
    .bind(regular_price)
    .bind(discount_price)
    .bind(currency)
    .bind(availability)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Returns all offers for a product.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_offers(pool: &PgPool, product_id: i64) -> Result<Vec<CatalogOfferRow>, DbError> {
    let rows = sqlx::query_as::<_, CatalogOfferRow>(&format!(
        "SELECT {OFFER_COLUMNS} FROM catalog_offers WHERE product_id = $1 ORDER BY vendor_id"
    ))
    .bind(product_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Attaches a canonical option (color or pattern) to a product,
/// get-or-creating the option row. Add-if-absent: replays are no-ops.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either write fails.
pub async fn add_product_option(
    pool: &PgPool,
    product_id: i64,
    kind: &str,
    value: &str,
) -> Result<(), DbError> {
    let option_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO catalog_options (kind, value) VALUES ($1, $2) \
         ON CONFLICT (kind, value) DO UPDATE SET value = EXCLUDED.value \
         RETURNING id",
    )
    .bind(kind)
    .bind(value)
    .fetch_one(pool)
    .await?;

    sqlx::query(
        "INSERT INTO catalog_product_options (product_id, option_id) \
         VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(product_id)
    .bind(option_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns the `(kind, value)` pairs attached to a product, ordered for
/// stable assertions.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_product_options(
    pool: &PgPool,
    product_id: i64,
) -> Result<Vec<(String, String)>, DbError> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT o.kind, o.value FROM catalog_options o \
         JOIN catalog_product_options po ON po.option_id = o.id \
         WHERE po.product_id = $1 \
         ORDER BY o.kind, o.value",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
