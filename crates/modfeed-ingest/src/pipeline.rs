//! The ingest pipeline: one raw vendor item in, one stored-and-hashed
//! scraped layer out, with change detection deciding whether downstream
//! work is enqueued at all.

use modfeed_core::{ItemFields, ScrapedItem};
use modfeed_db::{ChangeOutcome, DbError, VendorRow};
use sqlx::PgPool;

use crate::error::IngestError;
use crate::hash::content_hash;
use crate::images::{store_images, ImageFetcher, ImageStore};
use crate::price::parse_price;

/// What happened to one ingested item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Payload hash matched the change cache; only freshness timestamps
    /// were advanced. No parse job was enqueued.
    Unchanged,
    /// The scraped layer was stored (created or updated) and a parse job
    /// enqueued.
    Updated { record_id: i64 },
}

/// Ingests one scraped item for `vendor`.
///
/// Steps: required-field check, price token parsing, image fetch into the
/// content-addressed store, canonical hashing, change detection, and —
/// only when the payload actually changed — the scraped-layer upsert and
/// parse enqueue.
///
/// # Errors
///
/// Returns [`IngestError::MissingField`]/[`IngestError::EmptyField`] when a
/// required scraped field is absent or blank (callers drop the item and
/// move on), [`IngestError::PriceParse`] when no price token parses, and
/// [`IngestError::Db`] on storage failure.
pub async fn ingest_item<S: ImageStore>(
    pool: &PgPool,
    fetcher: &ImageFetcher,
    store: &S,
    vendor: &VendorRow,
    item: &ScrapedItem,
    cache_ttl_days: i64,
) -> Result<IngestOutcome, IngestError> {
    check_required(item)?;

    let fields = normalize(fetcher, store, vendor, item).await?;
    let hash = content_hash(&fields);

    let outcome = modfeed_db::detect_change(pool, vendor.id, &item.key, &hash).await?;

    match outcome {
        ChangeOutcome::Unchanged => {
            modfeed_db::touch_checked(pool, vendor.id, &item.key).await?;
            tracing::debug!(vendor = %vendor.slug, key = %item.key, "payload unchanged");
            Ok(IngestOutcome::Unchanged)
        }
        ChangeOutcome::Changed => {
            // Store, enqueue, and record the hash atomically: the cache may
            // only ever claim a payload that actually landed.
            let mut tx = pool.begin().await.map_err(DbError::from)?;
            let record =
                modfeed_db::upsert_scraped(&mut *tx, vendor.id, &item.key, &fields).await?;
            modfeed_db::enqueue_parse(&mut *tx, record.id).await?;
            modfeed_db::record_content_hash(&mut *tx, vendor.id, &item.key, &hash, cache_ttl_days)
                .await?;
            tx.commit().await.map_err(DbError::from)?;
            tracing::info!(
                vendor = %vendor.slug,
                key = %item.key,
                record_id = record.id,
                "scraped layer stored, parse enqueued"
            );
            Ok(IngestOutcome::Updated { record_id: record.id })
        }
    }
}

/// Marks every record of `vendor` whose key is absent from `seen_keys` as
/// dropped and enqueues one more parse cycle for each, so the catalog entry
/// is hidden downstream. Call after a full feed snapshot has been ingested.
///
/// Returns the number of records newly marked dropped.
///
/// # Errors
///
/// Returns [`IngestError::Db`] on storage failure.
pub async fn finish_feed(
    pool: &PgPool,
    vendor: &VendorRow,
    seen_keys: &[String],
) -> Result<usize, IngestError> {
    let dropped = modfeed_db::mark_dropped_missing(pool, vendor.id, seen_keys).await?;
    for record_id in &dropped {
        modfeed_db::enqueue_parse(pool, *record_id).await?;
    }
    if !dropped.is_empty() {
        tracing::info!(
            vendor = %vendor.slug,
            count = dropped.len(),
            "records no longer reported by feed marked dropped"
        );
    }
    Ok(dropped.len())
}

/// Required-field gate. Identity fields plus the minimum the parser cannot
/// reconstruct: a name, a brand, a category, a URL, at least one price
/// token, and at least one image URL.
fn check_required(item: &ScrapedItem) -> Result<(), IngestError> {
    if item.key.trim().is_empty() {
        return Err(IngestError::EmptyField { field: "key" });
    }
    require_text(item.name.as_deref(), "name")?;
    require_text(item.brand.as_deref(), "brand")?;
    require_text(item.category.as_deref(), "category")?;
    require_text(item.url.as_deref(), "url")?;
    if item.price.is_none() && item.regular_price.is_none() && item.discount_price.is_none() {
        return Err(IngestError::MissingField { field: "price" });
    }
    if item.image_urls.is_empty() {
        return Err(IngestError::MissingField { field: "image_urls" });
    }
    Ok(())
}

fn require_text(value: Option<&str>, field: &'static str) -> Result<(), IngestError> {
    match value {
        None => Err(IngestError::MissingField { field }),
        Some(v) if v.trim().is_empty() => Err(IngestError::EmptyField { field }),
        Some(_) => Ok(()),
    }
}

/// Builds the canonical scraped layer: price tokens parsed to decimals, a
/// single resolved currency candidate, and images replaced by their storage
/// paths.
async fn normalize<S: ImageStore>(
    fetcher: &ImageFetcher,
    store: &S,
    vendor: &VendorRow,
    item: &ScrapedItem,
) -> Result<ItemFields, IngestError> {
    let (price, price_ccy) = item
        .price
        .as_deref()
        .map_or((None, None), parse_price);
    let (regular_price, regular_ccy) = item
        .regular_price
        .as_deref()
        .map_or((None, None), parse_price);
    let (discount_price, discount_ccy) = item
        .discount_price
        .as_deref()
        .map_or((None, None), parse_price);

    if price.is_none() && regular_price.is_none() && discount_price.is_none() {
        return Err(IngestError::PriceParse);
    }

    // Explicit currency field wins; otherwise the first currency any price
    // token carried.
    let currency = item
        .currency
        .clone()
        .or(regular_ccy)
        .or(discount_ccy)
        .or(price_ccy);

    let images = store_images(fetcher, store, &item.image_urls).await;

    Ok(ItemFields {
        sku: item.sku.clone(),
        name: item.name.clone(),
        description: item.description.clone(),
        brand: item.brand.clone(),
        brand_id: None,
        category: item.category.clone(),
        category_id: None,
        gender: item.gender.clone(),
        vendor: Some(vendor.slug.clone()),
        url: item.url.clone(),
        affiliate_id: item.affiliate_id.clone(),
        price,
        regular_price,
        discount_price,
        is_discount: None,
        currency,
        colors: item.colors.clone().map(|c| vec![c]),
        patterns: None,
        in_stock: item.in_stock,
        stock: item.stock,
        images: Some(images),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_item() -> ScrapedItem {
        ScrapedItem {
            key: "key-1".to_string(),
            sku: None,
            name: Some("Oxford shirt".to_string()),
            description: Some("A shirt".to_string()),
            brand: Some("Shirtonomy".to_string()),
            category: Some("Skjorta".to_string()),
            gender: None,
            vendor: "shirtonomy".to_string(),
            url: Some("https://shirtonomy.se/p/oxford".to_string()),
            affiliate_id: None,
            price: None,
            regular_price: Some("1 299 SEK".to_string()),
            discount_price: None,
            currency: None,
            colors: None,
            in_stock: Some(true),
            stock: None,
            image_urls: vec!["https://cdn.example.com/front.jpg".to_string()],
        }
    }

    #[test]
    fn required_check_passes_for_complete_item() {
        assert!(check_required(&minimal_item()).is_ok());
    }

    #[test]
    fn missing_name_is_reported_as_missing_field() {
        let mut item = minimal_item();
        item.name = None;
        match check_required(&item) {
            Err(IngestError::MissingField { field }) => assert_eq!(field, "name"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn blank_brand_is_reported_as_empty_field() {
        let mut item = minimal_item();
        item.brand = Some("   ".to_string());
        match check_required(&item) {
            Err(IngestError::EmptyField { field }) => assert_eq!(field, "brand"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn item_without_any_price_token_is_rejected() {
        let mut item = minimal_item();
        item.regular_price = None;
        match check_required(&item) {
            Err(IngestError::MissingField { field }) => assert_eq!(field, "price"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn item_without_images_is_rejected() {
        let mut item = minimal_item();
        item.image_urls.clear();
        match check_required(&item) {
            Err(IngestError::MissingField { field }) => assert_eq!(field, "image_urls"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
