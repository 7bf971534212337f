//! Import-queue worker.

use std::time::Duration;

use modfeed_core::AppConfig;
use modfeed_db::{JobRow, QueueName};
use sqlx::PgPool;

use crate::error::ImportError;
use crate::import::import_record;

/// Runs the import worker loop until the process is stopped.
///
/// # Errors
///
/// Returns [`ImportError::Db`] if the queue itself becomes unusable.
pub async fn run_import_worker(pool: &PgPool, config: &AppConfig) -> Result<(), ImportError> {
    let worker_id = format!("import-{}", std::process::id());
    let idle = Duration::from_millis(config.worker_poll_interval_ms);

    tracing::info!(worker = %worker_id, "import worker started");

    loop {
        let Some(job) = modfeed_db::claim_next_job(
            pool,
            QueueName::Import,
            &worker_id,
            config.queue_visibility_timeout_secs,
        )
        .await?
        else {
            tokio::time::sleep(idle).await;
            continue;
        };

        handle_job(pool, config, &job).await?;
    }
}

async fn handle_job(pool: &PgPool, config: &AppConfig, job: &JobRow) -> Result<(), ImportError> {
    // Parse jobs never carry the flag; an import job without it is malformed
    // and treated as a rejection so nothing unvetted reaches the catalog.
    let is_validated = job.is_validated.unwrap_or(false);

    match import_record(pool, job.record_id, is_validated).await {
        Ok(()) => {
            modfeed_db::complete_job(pool, job.id).await?;
        }
        Err(e) if e.is_skippable() => {
            tracing::warn!(record_id = job.record_id, error = %e, "skipping record");
            // Keep the record off the front of the next run.
            modfeed_db::advance_modified(pool, job.record_id).await.ok();
            modfeed_db::complete_job(pool, job.id).await?;
        }
        Err(e) => {
            tracing::error!(
                record_id = job.record_id,
                attempts = job.attempts,
                error = %e,
                "import failed"
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
