use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    /// Root directory of the content-addressed image store.
    pub image_store_path: PathBuf,
    /// Base URL used for direct hosted redirect buy links.
    pub site_base_url: String,
    pub vendors_path: PathBuf,
    pub aliases_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub fetch_user_agent: String,
    /// Upper bound of the randomized polite delay between image fetches.
    pub fetch_inter_request_delay_ms: u64,
    /// Sleep between polls when a worker finds its queue empty.
    pub worker_poll_interval_ms: u64,
    pub queue_max_attempts: u32,
    pub queue_retry_backoff_secs: u64,
    /// How long a claimed job may sit `running` before another worker may
    /// reclaim it (covers workers that died mid-job).
    pub queue_visibility_timeout_secs: u64,
    pub change_cache_ttl_days: i64,
    pub purge_after_days: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("image_store_path", &self.image_store_path)
            .field("site_base_url", &self.site_base_url)
            .field("vendors_path", &self.vendors_path)
            .field("aliases_path", &self.aliases_path)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("fetch_user_agent", &self.fetch_user_agent)
            .field(
                "fetch_inter_request_delay_ms",
                &self.fetch_inter_request_delay_ms,
            )
            .field("worker_poll_interval_ms", &self.worker_poll_interval_ms)
            .field("queue_max_attempts", &self.queue_max_attempts)
            .field("queue_retry_backoff_secs", &self.queue_retry_backoff_secs)
            .field(
                "queue_visibility_timeout_secs",
                &self.queue_visibility_timeout_secs,
            )
            .field("change_cache_ttl_days", &self.change_cache_ttl_days)
            .field("purge_after_days", &self.purge_after_days)
            .finish()
    }
}
