//! Parse-queue worker.

use std::time::Duration;

use modfeed_core::AppConfig;
use modfeed_db::{JobRow, MappingKind, QueueName, TaxonomyMappingRow};
use sqlx::PgPool;

use crate::aliases::AliasSet;
use crate::context::ParseContext;
use crate::error::ParseError;
use crate::modules::run_modules;
use crate::validate::validate;

/// Parses one import record end to end: load, map, run the module
/// pipeline, validate, store the outcome, enqueue the import job.
///
/// Returns whether the record validated.
///
/// # Errors
///
/// Returns [`ParseError::RecordMissing`] / [`ParseError::VendorMissing`]
/// when the record or its vendor no longer exists (skippable), or
/// [`ParseError::Db`] on a query failure. A rejected record is not an
/// error; it is recorded and enqueued with `is_validated = false`.
pub async fn parse_record(
    pool: &PgPool,
    aliases: &AliasSet,
    site_base_url: &str,
    record_id: i64,
) -> Result<bool, ParseError> {
    let record = modfeed_db::get_record(pool, record_id)
        .await?
        .ok_or(ParseError::RecordMissing(record_id))?;
    let vendor = modfeed_db::get_vendor(pool, record.vendor_id)
        .await?
        .ok_or(ParseError::VendorMissing(record.vendor_id))?;

    let scraped = &record.scraped.0;

    let brand_mapping =
        mapping_for(pool, MappingKind::Brand, vendor.id, scraped.brand.as_deref()).await?;
    let category_mapping = mapping_for(
        pool,
        MappingKind::Category,
        vendor.id,
        scraped.category.as_deref(),
    )
    .await?;

    let ctx = ParseContext {
        vendor: &vendor,
        item_key: &record.item_key,
        site_base_url,
        brand_mapping: brand_mapping.as_ref(),
        category_mapping: category_mapping.as_ref(),
        aliases,
    };
    let parsed = run_modules(&ctx, scraped);

    let reasons = validate(&vendor, record.is_dropped, &parsed);
    let validated = reasons.is_empty();
    if !validated {
        tracing::info!(
            vendor = %vendor.slug,
            key = %record.item_key,
            reasons = ?reasons,
            "record rejected"
        );
    }

    modfeed_db::record_parse_outcome(
        pool,
        record.id,
        &parsed,
        validated,
        brand_mapping.as_ref().map(|m| m.id),
        category_mapping.as_ref().map(|m| m.id),
    )
    .await?;
    modfeed_db::enqueue_import(pool, record.id, validated).await?;

    Ok(validated)
}

/// Get-or-creates the mapping row for a raw value, skipping blank input.
async fn mapping_for(
    pool: &PgPool,
    kind: MappingKind,
    vendor_id: i64,
    raw: Option<&str>,
) -> Result<Option<TaxonomyMappingRow>, ParseError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    let row = modfeed_db::get_or_create_mapping(pool, kind, vendor_id, raw).await?;
    Ok(Some(row))
}

/// Runs the parse worker loop until the process is stopped.
///
/// Alias tables are loaded once at startup; restart the worker (or call
/// [`AliasSet::reload`] from a supervisor) to pick up curation changes.
/// Skippable per-record errors complete the job so it is not redelivered;
/// anything else fails the job into the retry/backoff path.
///
/// # Errors
///
/// Returns [`ParseError::Db`] if the queue itself becomes unusable.
pub async fn run_parse_worker(pool: &PgPool, config: &AppConfig) -> Result<(), ParseError> {
    let aliases = AliasSet::load(pool).await?;
    let worker_id = format!("parse-{}", std::process::id());
    let idle = Duration::from_millis(config.worker_poll_interval_ms);

    tracing::info!(worker = %worker_id, "parse worker started");

    loop {
        let Some(job) = modfeed_db::claim_next_job(
            pool,
            QueueName::Parse,
            &worker_id,
            config.queue_visibility_timeout_secs,
        )
        .await?
        else {
            tokio::time::sleep(idle).await;
            continue;
        };

        handle_job(pool, &aliases, config, &job).await?;
    }
}

async fn handle_job(
    pool: &PgPool,
    aliases: &AliasSet,
    config: &AppConfig,
    job: &JobRow,
) -> Result<(), ParseError> {
    match parse_record(pool, aliases, &config.site_base_url, job.record_id).await {
        Ok(validated) => {
            tracing::debug!(record_id = job.record_id, validated, "record parsed");
            modfeed_db::complete_job(pool, job.id).await?;
        }
        Err(e) if e.is_skippable() => {
            tracing::warn!(record_id = job.record_id, error = %e, "skipping record");
            modfeed_db::complete_job(pool, job.id).await?;
        }
        Err(e) => {
            tracing::error!(
                record_id = job.record_id,
                attempts = job.attempts,
                error = %e,
                "parse failed"
            );
            modfeed_db::fail_job(
                pool,
                job.id,
                &e.to_string(),
                config.queue_max_attempts,
                config.queue_retry_backoff_secs,
            )
            .await?;
        }
    }
    Ok(())
}
