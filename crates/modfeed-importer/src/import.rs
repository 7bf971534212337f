//! One record's import: catalog product, offer, options.

use modfeed_core::ItemFields;
use modfeed_db::{ImportRecordRow, NewProduct, VendorRow};
use sqlx::PgPool;

use crate::error::ImportError;
use crate::reconcile::{product_slug, reconcile, ReconcileTarget};

/// Offer availability in catalog terms: a known stock count as-is, -1 for
/// in stock with an unknown count, 0 for unavailable. A record that says
/// nothing about stock is treated as in stock; its feed would have dropped
/// it otherwise.
#[must_use]
pub fn offer_availability(stock: Option<i32>, in_stock: Option<bool>) -> i32 {
    match (stock, in_stock) {
        (Some(n), _) => n.max(0),
        (None, Some(false)) => 0,
        (None, _) => -1,
    }
}

/// Imports one record: a validated record is written into the catalog, a
/// rejected record hides its catalog entry. Either way the work is
/// replay-safe; running the same import twice leaves the catalog exactly
/// as one run does.
///
/// # Errors
///
/// Returns [`ImportError::RecordMissing`] / [`ImportError::VendorMissing`]
/// when the row or its vendor is gone, [`ImportError::FinalLayerMissing`] /
/// [`ImportError::FinalLayerIncomplete`] when a validated record's final
/// layer is unusable (all skippable), or [`ImportError::Db`] on a write
/// failure.
pub async fn import_record(
    pool: &PgPool,
    record_id: i64,
    is_validated: bool,
) -> Result<(), ImportError> {
    let record = modfeed_db::get_record(pool, record_id)
        .await?
        .ok_or(ImportError::RecordMissing(record_id))?;
    let vendor = modfeed_db::get_vendor(pool, record.vendor_id)
        .await?
        .ok_or(ImportError::VendorMissing(record.vendor_id))?;

    if is_validated {
        import_validated(pool, &record, &vendor).await
    } else {
        hide_rejected(pool, &record, &vendor).await
    }
}

async fn import_validated(
    pool: &PgPool,
    record: &ImportRecordRow,
    vendor: &VendorRow,
) -> Result<(), ImportError> {
    let fields = record
        .final_layer
        .as_ref()
        .map(|j| &j.0)
        .ok_or(ImportError::FinalLayerMissing(record.id))?;

    let name = required(fields.name.as_deref(), record.id, "name")?;
    let brand = required(fields.brand.as_deref(), record.id, "brand")?;
    let buy_url = required(fields.url.as_deref(), record.id, "url")?;
    let catalog_vendor_id = vendor
        .catalog_vendor_id
        .ok_or(ImportError::FinalLayerIncomplete {
            record_id: record.id,
            field: "catalog vendor link",
        })?;

    // Curation may name a canonical entity before the catalog has a row for
    // it; create those lazily here.
    let brand_id = match fields.brand_id {
        Some(id) => id,
        None => modfeed_db::get_or_create_brand(pool, brand).await?,
    };
    let category_id = match (fields.category_id, fields.category.as_deref()) {
        (Some(id), _) => Some(id),
        (None, Some(category)) => Some(modfeed_db::get_or_create_category(pool, category).await?),
        (None, None) => None,
    };

    let availability = offer_availability(fields.stock, fields.in_stock);
    let slug = product_slug(brand, name);
    let product = NewProduct {
        slug: &slug,
        name,
        description: fields.description.as_deref(),
        brand_id: Some(brand_id),
        category_id,
        gender: fields.gender.as_deref(),
        image_path: fields.primary_image(),
        is_available: availability != 0,
    };

    let product_id = match reconcile(pool, record, fields).await? {
        ReconcileTarget::Linked(existing) => {
            modfeed_db::update_product(pool, existing.id, &product).await?;
            existing.id
        }
        ReconcileTarget::SlugMatch(existing) => {
            modfeed_db::update_product(pool, existing.id, &product).await?;
            modfeed_db::set_forward_link(pool, record.id, existing.id).await?;
            existing.id
        }
        ReconcileTarget::New => {
            let created = modfeed_db::upsert_product_by_slug(pool, &product).await?;
            modfeed_db::set_forward_link(pool, record.id, created.id).await?;
            created.id
        }
    };

    modfeed_db::upsert_offer(
        pool,
        product_id,
        catalog_vendor_id,
        buy_url,
        fields.regular_price,
        fields.discount_price,
        fields.currency.as_deref(),
        availability,
    )
    .await?;

    attach_options(pool, product_id, fields).await?;
    modfeed_db::mark_imported(pool, record.id).await?;

    tracing::info!(
        vendor = %vendor.slug,
        key = %record.item_key,
        product_id,
        availability,
        "record imported"
    );
    Ok(())
}

async fn attach_options(
    pool: &PgPool,
    product_id: i64,
    fields: &ItemFields,
) -> Result<(), ImportError> {
    for color in fields.colors.iter().flatten() {
        modfeed_db::add_product_option(pool, product_id, "color", color).await?;
    }
    for pattern in fields.patterns.iter().flatten() {
        modfeed_db::add_product_option(pool, product_id, "pattern", pattern).await?;
    }
    Ok(())
}

/// A rejected record never deletes anything; its catalog entry (if it has
/// one) goes unavailable and every offer's availability is zeroed.
async fn hide_rejected(
    pool: &PgPool,
    record: &ImportRecordRow,
    vendor: &VendorRow,
) -> Result<(), ImportError> {
    let fields = record
        .final_layer
        .as_ref()
        .map(|j| &j.0)
        .or(record.parsed.as_ref().map(|j| &j.0));

    let target = match fields {
        Some(fields) => reconcile(pool, record, fields).await?,
        // Never parsed successfully; only the forward link can find it.
        None => match record.catalog_product_id {
            Some(id) => modfeed_db::get_product(pool, id)
                .await?
                .map_or(ReconcileTarget::New, ReconcileTarget::Linked),
            None => ReconcileTarget::New,
        },
    };

    match target {
        ReconcileTarget::Linked(product) | ReconcileTarget::SlugMatch(product) => {
            modfeed_db::hide_product(pool, product.id).await?;
            tracing::info!(
                vendor = %vendor.slug,
                key = %record.item_key,
                product_id = product.id,
                "rejected record hidden from catalog"
            );
        }
        ReconcileTarget::New => {
            tracing::debug!(
                vendor = %vendor.slug,
                key = %record.item_key,
                "rejected record has no catalog entry to hide"
            );
        }
    }

    modfeed_db::advance_modified(pool, record.id).await?;
    Ok(())
}

fn required<'a>(
    value: Option<&'a str>,
    record_id: i64,
    field: &'static str,
) -> Result<&'a str, ImportError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ImportError::FinalLayerIncomplete { record_id, field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_prefers_known_stock() {
        assert_eq!(offer_availability(Some(7), Some(true)), 7);
        assert_eq!(offer_availability(Some(7), Some(false)), 7);
    }

    #[test]
    fn negative_stock_counts_clamp_to_unavailable() {
        assert_eq!(offer_availability(Some(-3), Some(true)), 0);
    }

    #[test]
    fn unknown_count_in_stock_is_minus_one() {
        assert_eq!(offer_availability(None, Some(true)), -1);
        assert_eq!(offer_availability(None, None), -1);
    }

    #[test]
    fn out_of_stock_is_zero() {
        assert_eq!(offer_availability(None, Some(false)), 0);
    }

    #[test]
    fn required_rejects_blank_values() {
        assert!(required(Some("  "), 1, "name").is_err());
        assert!(required(None, 1, "name").is_err());
        assert_eq!(required(Some("Acme"), 1, "name").unwrap(), "Acme");
    }
}
