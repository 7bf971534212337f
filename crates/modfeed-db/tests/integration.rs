//! Offline unit tests for modfeed-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use modfeed_core::{AppConfig, Environment, ItemFields};
use modfeed_db::{CatalogOfferRow, ImportRecordRow, JobRow, PoolConfig};

fn test_app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        image_store_path: PathBuf::from("./images"),
        site_base_url: "https://modfeed.example".to_string(),
        vendors_path: PathBuf::from("./config/vendors.yaml"),
        aliases_path: PathBuf::from("./config/aliases.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        fetch_timeout_secs: 30,
        fetch_user_agent: "ua".to_string(),
        fetch_inter_request_delay_ms: 250,
        worker_poll_interval_ms: 1000,
        queue_max_attempts: 5,
        queue_retry_backoff_secs: 60,
        queue_visibility_timeout_secs: 600,
        change_cache_ttl_days: 90,
        purge_after_days: 180,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&test_app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn pool_config_default_is_sane() {
    let pool_config = PoolConfig::default();
    assert!(pool_config.max_connections >= pool_config.min_connections);
    assert!(pool_config.acquire_timeout_secs > 0);
}

/// Compile-time smoke test: confirm that [`ImportRecordRow`] carries the four
/// layers with the expected optionality. No database required.
#[test]
fn import_record_row_has_expected_fields() {
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    let row = ImportRecordRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        vendor_id: 2_i64,
        item_key: "shirt-42".to_string(),
        scraped: Json(ItemFields::default()),
        parsed: None,
        manual: None,
        final_layer: None,
        is_dropped: false,
        is_validated: false,
        is_released: false,
        catalog_product_id: None,
        brand_mapping_id: None,
        category_mapping_id: None,
        created: Utc::now(),
        modified: Utc::now(),
        checked_at: None,
        parsed_date: None,
        imported_date: None,
    };

    assert_eq!(row.item_key, "shirt-42");
    assert!(row.parsed.is_none());
    assert!(row.final_layer.is_none());
    assert!(!row.is_validated);
}

#[test]
fn job_row_has_expected_fields() {
    let row = JobRow {
        id: 1_i64,
        queue: "parse".to_string(),
        record_id: 2_i64,
        is_validated: None,
        attempts: 0_i32,
    };

    assert_eq!(row.queue, "parse");
    assert!(row.is_validated.is_none());
}

#[test]
fn catalog_offer_row_has_expected_fields() {
    use chrono::Utc;
    use rust_decimal::Decimal;

    let row = CatalogOfferRow {
        id: 1_i64,
        product_id: 2_i64,
        vendor_id: 3_i64,
        buy_url: "https://modfeed.example/redirect/shirtonomy/shirt-42".to_string(),
        regular_price: Some(Decimal::new(129_900, 2)),
        discount_price: None,
        currency: Some("SEK".to_string()),
        availability: -1_i32,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.availability, -1);
    assert!(row.discount_price.is_none());
}
