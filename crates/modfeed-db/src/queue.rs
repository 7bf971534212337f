//! Durable at-least-once work queues over the `queue_jobs` table.
//!
//! One table carries both the parse queue and the site-import queue.
//! Consumers claim jobs with `FOR UPDATE SKIP LOCKED`, so several workers
//! can drain one queue without coordination. Delivery is at-least-once:
//! a worker that dies after claiming leaves the job `running`, and once its
//! `locked_at` ages past the visibility timeout the claim query picks the
//! job up again; a completed handler whose `complete` write is lost will
//! likewise be redelivered. Downstream writes are idempotent natural-key
//! upserts, so duplicates are harmless.

use sqlx::PgPool;

use crate::DbError;

/// The two queues of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueName {
    Parse,
    Import,
}

impl QueueName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QueueName::Parse => "parse",
            QueueName::Import => "import",
        }
    }
}

/// A claimed job.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobRow {
    pub id: i64,
    pub queue: String,
    pub record_id: i64,
    /// Parse outcome carried on the import queue; NULL on the parse queue.
    pub is_validated: Option<bool>,
    pub attempts: i32,
}

/// Enqueues a parse job for an import record. Takes any executor so ingest
/// can enqueue inside the transaction that stores the scraped layer.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn enqueue_parse<'e, E>(executor: E, record_id: i64) -> Result<(), DbError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query("INSERT INTO queue_jobs (queue, record_id) VALUES ('parse', $1)")
        .bind(record_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Enqueues a site-import job carrying the parse outcome.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn enqueue_import(pool: &PgPool, record_id: i64, is_validated: bool) -> Result<(), DbError> {
    sqlx::query("INSERT INTO queue_jobs (queue, record_id, is_validated) VALUES ('import', $1, $2)")
        .bind(record_id)
        .bind(is_validated)
        .execute(pool)
        .await?;
    Ok(())
}

/// Claims the oldest due job on `queue`, marking it `running` and bumping
/// `attempts`. Returns `None` when the queue is empty.
///
/// A `running` job whose `locked_at` is older than `visibility_timeout_secs`
/// counts as abandoned and is claimable again, so a crashed worker cannot
/// strand a job. Each reclaim bumps `attempts`, and a handler failure after
/// the reclaim parks the job once the attempts bound is reached.
///
/// The claim runs in one transaction: `FOR UPDATE SKIP LOCKED` keeps
/// concurrent workers from claiming the same row without blocking each
/// other.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query in the claim transaction fails.
pub async fn claim_next_job(
    pool: &PgPool,
    queue: QueueName,
    worker_id: &str,
    visibility_timeout_secs: u64,
) -> Result<Option<JobRow>, DbError> {
    let mut tx = pool.begin().await?;

    let job = sqlx::query_as::<_, JobRow>(
        "SELECT id, queue, record_id, is_validated, attempts FROM queue_jobs \
         WHERE queue = $1 AND scheduled_at <= NOW() \
           AND (status = 'queued' \
                OR (status = 'running' \
                    AND locked_at < NOW() - ($2 * INTERVAL '1 second'))) \
         ORDER BY scheduled_at, id \
         FOR UPDATE SKIP LOCKED LIMIT 1",
    )
    .bind(queue.as_str())
    .bind(i64::try_from(visibility_timeout_secs).unwrap_or(i64::MAX))
    .fetch_optional(&mut *tx)
    .await?;

    let Some(job) = job else {
        tx.rollback().await?;
        return Ok(None);
    };

    sqlx::query(
        "UPDATE queue_jobs \
         SET status = 'running', locked_at = NOW(), locked_by = $2, \
             attempts = attempts + 1, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(job.id)
    .bind(worker_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Some(JobRow {
        attempts: job.attempts + 1,
        ..job
    }))
}

/// Marks a job done.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn complete_job(pool: &PgPool, job_id: i64) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE queue_jobs \
         SET status = 'done', last_error = NULL, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(job_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Records a failed attempt. Requeues with linear backoff
/// (`attempts * backoff_secs`) until `max_attempts` is reached, after which
/// the job is parked as `failed` for operator inspection.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn fail_job(
    pool: &PgPool,
    job_id: i64,
    error: &str,
    max_attempts: u32,
    backoff_secs: u64,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE queue_jobs SET \
             status = CASE WHEN attempts >= $3 THEN 'failed' ELSE 'queued' END, \
             scheduled_at = NOW() + (attempts * $4 * INTERVAL '1 second'), \
             last_error = $2, \
             locked_at = NULL, locked_by = NULL, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(job_id)
    .bind(error)
    .bind(i64::from(max_attempts))
    .bind(i64::try_from(backoff_secs).unwrap_or(i64::MAX))
    .execute(pool)
    .await?;
    Ok(())
}
