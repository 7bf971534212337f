use thiserror::Error;

use crate::app_config::{AppConfig, Environment};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read {path}: {source}")]
    SourceFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse source file: {0}")]
    SourceFileParse(#[from] serde_yaml::Error),
    #[error("source file validation failed: {0}")]
    Validation(String),
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("MODFEED_ENV", "development"));
    let log_level = or_default("MODFEED_LOG_LEVEL", "info");

    let image_store_path = PathBuf::from(or_default("MODFEED_IMAGE_STORE_PATH", "./data/images"));
    let site_base_url = or_default("MODFEED_SITE_BASE_URL", "https://modfeed.example");
    let vendors_path = PathBuf::from(or_default("MODFEED_VENDORS_PATH", "./config/vendors.yaml"));
    let aliases_path = PathBuf::from(or_default("MODFEED_ALIASES_PATH", "./config/aliases.yaml"));

    let db_max_connections = parse_u32("MODFEED_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("MODFEED_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("MODFEED_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let fetch_timeout_secs = parse_u64("MODFEED_FETCH_TIMEOUT_SECS", "30")?;
    let fetch_user_agent = or_default("MODFEED_FETCH_USER_AGENT", "modfeed/0.1 (product-feed)");
    let fetch_inter_request_delay_ms = parse_u64("MODFEED_FETCH_INTER_REQUEST_DELAY_MS", "500")?;

    let worker_poll_interval_ms = parse_u64("MODFEED_WORKER_POLL_INTERVAL_MS", "1000")?;
    let queue_max_attempts = parse_u32("MODFEED_QUEUE_MAX_ATTEMPTS", "5")?;
    let queue_retry_backoff_secs = parse_u64("MODFEED_QUEUE_RETRY_BACKOFF_SECS", "60")?;
    let queue_visibility_timeout_secs = parse_u64("MODFEED_QUEUE_VISIBILITY_TIMEOUT_SECS", "600")?;

    let change_cache_ttl_days = parse_i64("MODFEED_CHANGE_CACHE_TTL_DAYS", "90")?;
    let purge_after_days = parse_i64("MODFEED_PURGE_AFTER_DAYS", "365")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        image_store_path,
        site_base_url,
        vendors_path,
        aliases_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        fetch_timeout_secs,
        fetch_user_agent,
        fetch_inter_request_delay_ms,
        worker_poll_interval_ms,
        queue_max_attempts,
        queue_retry_backoff_secs,
        queue_visibility_timeout_secs,
        change_cache_ttl_days,
        purge_after_days,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
