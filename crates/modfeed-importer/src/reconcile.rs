//! Matching an import record to its catalog product.
//!
//! Strategies, in order: the stored forward link, then a slug built from
//! the final layer's brand and name, then nothing (a fresh product will be
//! created). A broken forward link or a slug miss is not an error; it is
//! logged and falls through to the next strategy.

use modfeed_core::{slugify, ItemFields};
use modfeed_db::{CatalogProductRow, ImportRecordRow};
use sqlx::PgPool;

use crate::error::ImportError;

/// Where an import record lands in the catalog.
#[derive(Debug)]
pub enum ReconcileTarget {
    /// Forward link still resolves.
    Linked(CatalogProductRow),
    /// Matched an existing product by slug; the link should be stored.
    SlugMatch(CatalogProductRow),
    /// No existing product; create one.
    New,
}

/// Canonical product slug: brand then name, slugified as one phrase.
#[must_use]
pub fn product_slug(brand: &str, name: &str) -> String {
    slugify(&format!("{brand} {name}"))
}

/// Resolves the catalog product for `record` using `fields` (normally the
/// final layer).
///
/// # Errors
///
/// Returns [`ImportError::Db`] on a query failure.
pub async fn reconcile(
    pool: &PgPool,
    record: &ImportRecordRow,
    fields: &ItemFields,
) -> Result<ReconcileTarget, ImportError> {
    if let Some(product_id) = record.catalog_product_id {
        match modfeed_db::get_product(pool, product_id).await? {
            Some(product) => return Ok(ReconcileTarget::Linked(product)),
            None => {
                tracing::warn!(
                    record_id = record.id,
                    product_id,
                    "forward link no longer resolves, falling back to slug"
                );
            }
        }
    }

    if let (Some(brand), Some(name)) = (fields.brand.as_deref(), fields.name.as_deref()) {
        let slug = product_slug(brand, name);
        if let Some(product) = modfeed_db::find_product_by_slug(pool, &slug).await? {
            return Ok(ReconcileTarget::SlugMatch(product));
        }
    }

    Ok(ReconcileTarget::New)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_joins_brand_and_name() {
        assert_eq!(product_slug("Acme", "Oxford Shirt"), "acme-oxford-shirt");
    }

    #[test]
    fn slug_strips_punctuation_and_case() {
        assert_eq!(
            product_slug("Maison Margiela", "Tabi (Split-Toe) Boot"),
            "maison-margiela-tabi-split-toe-boot"
        );
    }
}
