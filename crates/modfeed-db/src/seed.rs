//! Seeding routines for vendors and alias groups from the YAML config files.

use modfeed_core::{AliasSeedFile, VendorEntry};
use sqlx::PgPool;

use crate::DbError;

/// Upserts vendors from config into the database.
///
/// Returns the number of vendors processed. All upserts run inside a single
/// transaction; if any operation fails the entire batch is rolled back.
/// `catalog_vendor_id` is deliberately not touched here — wiring a vendor to
/// the catalog is an operator action, not a seed concern.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_vendors(pool: &PgPool, vendors: &[VendorEntry]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for vendor in vendors {
        sqlx::query(
            "INSERT INTO vendors (slug, name, affiliate_network, affiliate_id, is_active) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (slug) DO UPDATE SET \
                 name              = EXCLUDED.name, \
                 affiliate_network = EXCLUDED.affiliate_network, \
                 affiliate_id      = EXCLUDED.affiliate_id, \
                 is_active         = EXCLUDED.is_active, \
                 updated_at        = NOW()",
        )
        .bind(vendor.slug())
        .bind(&vendor.name)
        .bind(&vendor.affiliate_network)
        .bind(&vendor.affiliate_id)
        .bind(vendor.active)
        .execute(&mut *tx)
        .await?;
        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}

/// Upserts alias groups for gender, color, and pattern from the seed file.
///
/// Returns the number of groups processed, in one transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_alias_groups(pool: &PgPool, seeds: &AliasSeedFile) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for (kind, groups) in [
        ("gender", &seeds.gender),
        ("color", &seeds.color),
        ("pattern", &seeds.pattern),
    ] {
        for group in groups {
            sqlx::query(
                "INSERT INTO alias_groups (kind, canonical_key, aliases, priority) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (kind, canonical_key) DO UPDATE SET \
                     aliases    = EXCLUDED.aliases, \
                     priority   = EXCLUDED.priority, \
                     updated_at = NOW()",
            )
            .bind(kind)
            .bind(&group.key)
            .bind(&group.aliases)
            .bind(group.priority)
            .execute(&mut *tx)
            .await?;
            count += 1;
        }
    }

    tx.commit().await?;
    Ok(count)
}
