use std::io::BufRead;
use std::path::Path;

use modfeed_core::{AppConfig, ScrapedItem};
use modfeed_ingest::{FsImageStore, ImageFetcher, IngestOutcome};

/// Ingests a JSON-lines feed snapshot for one vendor.
///
/// Each line is one scraped item. Per-item failures (missing fields,
/// unparseable prices, malformed lines) are logged and skipped; the run
/// continues. Unless `partial` is set, records the snapshot no longer
/// reports are marked dropped afterwards.
///
/// # Errors
///
/// Returns an error if the vendor is unknown, the file cannot be read, or
/// a database write outside the per-item path fails.
pub(crate) async fn run_ingest(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    vendor_slug: &str,
    file: &Path,
    partial: bool,
) -> anyhow::Result<()> {
    let vendor = modfeed_db::get_vendor_by_slug(pool, vendor_slug)
        .await?
        .ok_or_else(|| anyhow::anyhow!("unknown vendor slug {vendor_slug:?}; run seed first"))?;

    let fetcher = ImageFetcher::new(
        config.fetch_timeout_secs,
        &config.fetch_user_agent,
        config.fetch_inter_request_delay_ms,
    )?;
    let store = FsImageStore::new(&config.image_store_path);

    let reader = std::io::BufReader::new(std::fs::File::open(file)?);
    let mut seen_keys = Vec::new();
    let mut updated = 0usize;
    let mut unchanged = 0usize;
    let mut skipped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let item: ScrapedItem = match serde_json::from_str(&line) {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(vendor = %vendor.slug, line = line_no + 1, error = %e, "malformed line skipped");
                skipped += 1;
                continue;
            }
        };
        if item.vendor != vendor.slug {
            tracing::warn!(
                vendor = %vendor.slug,
                key = %item.key,
                item_vendor = %item.vendor,
                "item belongs to a different vendor, skipped"
            );
            skipped += 1;
            continue;
        }

        seen_keys.push(item.key.clone());
        match modfeed_ingest::ingest_item(
            pool,
            &fetcher,
            &store,
            &vendor,
            &item,
            config.change_cache_ttl_days,
        )
        .await
        {
            Ok(IngestOutcome::Updated { .. }) => updated += 1,
            Ok(IngestOutcome::Unchanged) => unchanged += 1,
            Err(e) => {
                tracing::warn!(vendor = %vendor.slug, key = %item.key, error = %e, "item dropped");
                skipped += 1;
            }
        }
    }

    let dropped = if partial {
        0
    } else {
        modfeed_ingest::finish_feed(pool, &vendor, &seen_keys).await?
    };

    println!(
        "{}: {updated} updated, {unchanged} unchanged, {skipped} skipped, {dropped} dropped",
        vendor.slug
    );
    Ok(())
}
