/// Retention purge: removes long-dropped import records (their queue jobs
/// cascade) and expired change-cache entries.
///
/// # Errors
///
/// Returns an error if either delete fails.
pub(crate) async fn run_purge(pool: &sqlx::PgPool, older_than_days: i64) -> anyhow::Result<()> {
    let records = modfeed_db::purge_dropped_records(pool, older_than_days).await?;
    let cache_entries = modfeed_db::evict_expired_cache_entries(pool).await?;

    println!("purged {records} dropped records, {cache_entries} expired cache entries");
    Ok(())
}
