//! Live integration tests for modfeed-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/modfeed-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use modfeed_core::ItemFields;
use modfeed_db::{
    add_product_option, claim_next_job, complete_job, curate_mapping, enqueue_parse, fail_job,
    get_or_create_mapping, get_or_create_vendor, get_record, hide_product, list_alias_groups,
    list_offers, list_product_options, list_unmapped_mappings, mark_dropped_missing,
    detect_change, record_content_hash, record_parse_outcome, upsert_alias_group, upsert_offer,
    upsert_product_by_slug, upsert_scraped, AliasKind, ChangeOutcome, MappingKind, NewProduct,
    QueueName,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert a minimal vendor row and return its generated `id`.
async fn insert_test_vendor(pool: &sqlx::PgPool, slug: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO vendors (slug, name, affiliate_network) \
         VALUES ($1, $2, 'direct') RETURNING id",
    )
    .bind(slug)
    .bind(format!("Test Vendor {slug}"))
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_test_vendor failed for slug '{slug}': {e}"))
}

fn scraped_fields(name: &str) -> ItemFields {
    ItemFields {
        name: Some(name.to_string()),
        brand: Some("Acme".to_string()),
        ..ItemFields::default()
    }
}

// ---------------------------------------------------------------------------
// Section 1: Change cache
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn change_cache_reports_changed_then_unchanged(pool: sqlx::PgPool) {
    let vendor_id = insert_test_vendor(&pool, "shirtonomy").await;

    let first = detect_change(&pool, vendor_id, "shirt-1", "hash-a")
        .await
        .expect("first detect failed");
    assert_eq!(first, ChangeOutcome::Changed);
    record_content_hash(&pool, vendor_id, "shirt-1", "hash-a", 90)
        .await
        .expect("record failed");

    let second = detect_change(&pool, vendor_id, "shirt-1", "hash-a")
        .await
        .expect("second detect failed");
    assert_eq!(second, ChangeOutcome::Unchanged);

    let third = detect_change(&pool, vendor_id, "shirt-1", "hash-b")
        .await
        .expect("third detect failed");
    assert_eq!(third, ChangeOutcome::Changed);
}

#[sqlx::test(migrations = "../../migrations")]
async fn detecting_a_change_does_not_record_it(pool: sqlx::PgPool) {
    let vendor_id = insert_test_vendor(&pool, "shirtonomy").await;

    // Until the hash is recorded alongside a stored payload, every sighting
    // of the same payload keeps reporting a change.
    let first = detect_change(&pool, vendor_id, "shirt-1", "hash-a")
        .await
        .expect("first detect failed");
    assert_eq!(first, ChangeOutcome::Changed);

    let second = detect_change(&pool, vendor_id, "shirt-1", "hash-a")
        .await
        .expect("second detect failed");
    assert_eq!(second, ChangeOutcome::Changed);

    let cached: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM change_cache")
        .fetch_one(&pool)
        .await
        .expect("count failed");
    assert_eq!(cached, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn change_cache_is_scoped_per_vendor(pool: sqlx::PgPool) {
    let vendor_a = insert_test_vendor(&pool, "vendor-a").await;
    let vendor_b = insert_test_vendor(&pool, "vendor-b").await;

    record_content_hash(&pool, vendor_a, "shirt-1", "hash-a", 90)
        .await
        .expect("vendor a record failed");

    // Same key and hash under a different vendor is still a change.
    let outcome = detect_change(&pool, vendor_b, "shirt-1", "hash-a")
        .await
        .expect("vendor b detect failed");
    assert_eq!(outcome, ChangeOutcome::Changed);
}

// ---------------------------------------------------------------------------
// Section 2: Import records
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_scraped_is_idempotent_and_resets_dropped(pool: sqlx::PgPool) {
    let vendor_id = insert_test_vendor(&pool, "shirtonomy").await;

    let first = upsert_scraped(&pool, vendor_id, "shirt-1", &scraped_fields("Oxford"))
        .await
        .expect("first upsert failed");

    // Vendor stops reporting the item.
    let dropped = mark_dropped_missing(&pool, vendor_id, &[])
        .await
        .expect("mark_dropped_missing failed");
    assert_eq!(dropped, vec![first.id]);

    // Re-sighting the key reuses the row and clears the flag.
    let second = upsert_scraped(&pool, vendor_id, "shirt-1", &scraped_fields("Oxford v2"))
        .await
        .expect("second upsert failed");
    assert_eq!(second.id, first.id);
    assert!(!second.is_dropped);
    assert_eq!(second.scraped.0.name.as_deref(), Some("Oxford v2"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn mark_dropped_skips_seen_and_already_dropped(pool: sqlx::PgPool) {
    let vendor_id = insert_test_vendor(&pool, "shirtonomy").await;

    let keep = upsert_scraped(&pool, vendor_id, "keep", &scraped_fields("Keep"))
        .await
        .expect("upsert failed");
    let drop = upsert_scraped(&pool, vendor_id, "drop", &scraped_fields("Drop"))
        .await
        .expect("upsert failed");

    let first = mark_dropped_missing(&pool, vendor_id, &["keep".to_string()])
        .await
        .expect("first sweep failed");
    assert_eq!(first, vec![drop.id]);

    // A second sweep reports nothing new.
    let second = mark_dropped_missing(&pool, vendor_id, &["keep".to_string()])
        .await
        .expect("second sweep failed");
    assert!(second.is_empty());

    let keep_row = get_record(&pool, keep.id)
        .await
        .expect("get_record failed")
        .expect("row exists");
    assert!(!keep_row.is_dropped);
}

#[sqlx::test(migrations = "../../migrations")]
async fn validated_outcome_copies_parsed_into_final(pool: sqlx::PgPool) {
    let vendor_id = insert_test_vendor(&pool, "shirtonomy").await;
    let record = upsert_scraped(&pool, vendor_id, "shirt-1", &scraped_fields("Oxford"))
        .await
        .expect("upsert failed");

    let parsed = scraped_fields("Oxford parsed");
    record_parse_outcome(&pool, record.id, &parsed, true, Some(1), None)
        .await
        .expect("validated outcome failed");

    let row = get_record(&pool, record.id)
        .await
        .expect("get_record failed")
        .expect("row exists");
    assert!(row.is_validated);
    assert_eq!(row.parsed.as_ref().map(|j| &j.0), Some(&parsed));
    assert_eq!(row.final_layer.as_ref().map(|j| &j.0), Some(&parsed));
    assert!(row.parsed_date.is_some());
    assert_eq!(row.brand_mapping_id, Some(1));

    // A later rejection stores the new parsed layer but leaves final alone.
    let reparsed = scraped_fields("Oxford reparsed");
    record_parse_outcome(&pool, record.id, &reparsed, false, Some(1), None)
        .await
        .expect("rejected outcome failed");

    let row = get_record(&pool, record.id)
        .await
        .expect("get_record failed")
        .expect("row exists");
    assert!(!row.is_validated);
    assert_eq!(row.parsed.as_ref().map(|j| &j.0), Some(&reparsed));
    assert_eq!(row.final_layer.as_ref().map(|j| &j.0), Some(&parsed));
}

// ---------------------------------------------------------------------------
// Section 3: Mappings and alias groups
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn mapping_get_or_create_returns_one_row(pool: sqlx::PgPool) {
    let vendor_id = insert_test_vendor(&pool, "shirtonomy").await;

    let first = get_or_create_mapping(&pool, MappingKind::Brand, vendor_id, "ACME Co")
        .await
        .expect("first get_or_create failed");
    let second = get_or_create_mapping(&pool, MappingKind::Brand, vendor_id, "ACME Co")
        .await
        .expect("second get_or_create failed");
    assert_eq!(first.id, second.id);
    assert!(!first.is_curated());

    let backlog = list_unmapped_mappings(&pool, Some(MappingKind::Brand), Some(vendor_id))
        .await
        .expect("backlog listing failed");
    assert_eq!(backlog.len(), 1);

    curate_mapping(&pool, first.id, "Acme", None)
        .await
        .expect("curate failed");

    let backlog = list_unmapped_mappings(&pool, Some(MappingKind::Brand), Some(vendor_id))
        .await
        .expect("backlog listing failed");
    assert!(backlog.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn alias_groups_list_in_priority_then_id_order(pool: sqlx::PgPool) {
    upsert_alias_group(&pool, AliasKind::Color, "navy", &["navy".to_string()], 50)
        .await
        .expect("upsert failed");
    upsert_alias_group(&pool, AliasKind::Color, "blue", &["blue".to_string()], 10)
        .await
        .expect("upsert failed");

    let groups = list_alias_groups(&pool, AliasKind::Color)
        .await
        .expect("listing failed");
    let keys: Vec<&str> = groups.iter().map(|g| g.canonical_key.as_str()).collect();
    assert_eq!(keys, vec!["blue", "navy"]);

    // Re-seeding replaces aliases in place, keyed by (kind, canonical_key).
    upsert_alias_group(
        &pool,
        AliasKind::Color,
        "navy",
        &["navy".to_string(), "marine".to_string()],
        50,
    )
    .await
    .expect("re-upsert failed");
    let groups = list_alias_groups(&pool, AliasKind::Color)
        .await
        .expect("listing failed");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[1].aliases.len(), 2);
}

// ---------------------------------------------------------------------------
// Section 4: Queues
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn queue_claim_is_exclusive_until_completed(pool: sqlx::PgPool) {
    let vendor_id = insert_test_vendor(&pool, "shirtonomy").await;
    let record = upsert_scraped(&pool, vendor_id, "shirt-1", &scraped_fields("Oxford"))
        .await
        .expect("upsert failed");
    enqueue_parse(&pool, record.id).await.expect("enqueue failed");

    let job = claim_next_job(&pool, QueueName::Parse, "worker-1", 600)
        .await
        .expect("claim failed")
        .expect("job available");
    assert_eq!(job.record_id, record.id);
    assert_eq!(job.attempts, 1);
    assert!(job.is_validated.is_none());

    // Running job is invisible to other workers within the timeout.
    let other = claim_next_job(&pool, QueueName::Parse, "worker-2", 600)
        .await
        .expect("claim failed");
    assert!(other.is_none());

    complete_job(&pool, job.id).await.expect("complete failed");
    let after = claim_next_job(&pool, QueueName::Parse, "worker-1", 600)
        .await
        .expect("claim failed");
    assert!(after.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn abandoned_running_job_is_reclaimed_after_timeout(pool: sqlx::PgPool) {
    let vendor_id = insert_test_vendor(&pool, "shirtonomy").await;
    let record = upsert_scraped(&pool, vendor_id, "shirt-1", &scraped_fields("Oxford"))
        .await
        .expect("upsert failed");
    enqueue_parse(&pool, record.id).await.expect("enqueue failed");

    // worker-1 claims the job and then dies without completing it.
    let job = claim_next_job(&pool, QueueName::Parse, "worker-1", 600)
        .await
        .expect("claim failed")
        .expect("job available");

    let hidden = claim_next_job(&pool, QueueName::Parse, "worker-2", 600)
        .await
        .expect("claim failed");
    assert!(hidden.is_none());

    // A zero timeout makes the stale claim immediately visible again.
    let reclaimed = claim_next_job(&pool, QueueName::Parse, "worker-2", 0)
        .await
        .expect("reclaim failed")
        .expect("job reclaimed");
    assert_eq!(reclaimed.id, job.id);
    assert_eq!(reclaimed.attempts, 2);

    let locked_by: Option<String> =
        sqlx::query_scalar("SELECT locked_by FROM queue_jobs WHERE id = $1")
            .bind(job.id)
            .fetch_one(&pool)
            .await
            .expect("locked_by query failed");
    assert_eq!(locked_by.as_deref(), Some("worker-2"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn failed_job_requeues_until_attempts_exhausted(pool: sqlx::PgPool) {
    let vendor_id = insert_test_vendor(&pool, "shirtonomy").await;
    let record = upsert_scraped(&pool, vendor_id, "shirt-1", &scraped_fields("Oxford"))
        .await
        .expect("upsert failed");
    enqueue_parse(&pool, record.id).await.expect("enqueue failed");

    let job = claim_next_job(&pool, QueueName::Parse, "worker-1", 600)
        .await
        .expect("claim failed")
        .expect("job available");

    // Zero backoff so the requeued job is immediately due.
    fail_job(&pool, job.id, "boom", 2, 0).await.expect("fail failed");

    let retry = claim_next_job(&pool, QueueName::Parse, "worker-1", 600)
        .await
        .expect("claim failed")
        .expect("job requeued");
    assert_eq!(retry.id, job.id);
    assert_eq!(retry.attempts, 2);

    // Attempts bound reached: parked as failed, not redelivered.
    fail_job(&pool, retry.id, "boom again", 2, 0)
        .await
        .expect("fail failed");
    let parked = claim_next_job(&pool, QueueName::Parse, "worker-1", 0)
        .await
        .expect("claim failed");
    assert!(parked.is_none());

    let status: String = sqlx::query_scalar("SELECT status FROM queue_jobs WHERE id = $1")
        .bind(job.id)
        .fetch_one(&pool)
        .await
        .expect("status query failed");
    assert_eq!(status, "failed");
}

// ---------------------------------------------------------------------------
// Section 5: Catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn product_upsert_by_slug_overwrites_in_place(pool: sqlx::PgPool) {
    let first = upsert_product_by_slug(
        &pool,
        &NewProduct {
            slug: "acme-oxford-shirt",
            name: "Oxford Shirt",
            description: Some("A classic."),
            brand_id: None,
            category_id: None,
            gender: Some("M"),
            image_path: None,
            is_available: true,
        },
    )
    .await
    .expect("first upsert failed");

    let second = upsert_product_by_slug(
        &pool,
        &NewProduct {
            slug: "acme-oxford-shirt",
            name: "Oxford Shirt",
            description: Some("A classic, updated."),
            brand_id: None,
            category_id: None,
            gender: Some("M"),
            image_path: Some("ab/cd/abcd.jpg"),
            is_available: true,
        },
    )
    .await
    .expect("second upsert failed");

    assert_eq!(second.id, first.id);
    assert_eq!(second.description.as_deref(), Some("A classic, updated."));
    assert_eq!(second.image_path.as_deref(), Some("ab/cd/abcd.jpg"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn hide_product_zeroes_every_offer(pool: sqlx::PgPool) {
    let catalog_vendor_id = get_or_create_vendor(&pool, "Shirtonomy")
        .await
        .expect("vendor failed");
    let product = upsert_product_by_slug(
        &pool,
        &NewProduct {
            slug: "acme-oxford-shirt",
            name: "Oxford Shirt",
            description: None,
            brand_id: None,
            category_id: None,
            gender: None,
            image_path: None,
            is_available: true,
        },
    )
    .await
    .expect("product failed");

    upsert_offer(
        &pool,
        product.id,
        catalog_vendor_id,
        "https://modfeed.example/redirect/shirtonomy/shirt-1",
        None,
        None,
        Some("SEK"),
        -1,
    )
    .await
    .expect("offer failed");

    hide_product(&pool, product.id).await.expect("hide failed");

    let offers = list_offers(&pool, product.id).await.expect("list failed");
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].availability, 0);

    let available: bool =
        sqlx::query_scalar("SELECT is_available FROM catalog_products WHERE id = $1")
            .bind(product.id)
            .fetch_one(&pool)
            .await
            .expect("availability query failed");
    assert!(!available);
}

#[sqlx::test(migrations = "../../migrations")]
async fn product_options_are_add_if_absent(pool: sqlx::PgPool) {
    let product = upsert_product_by_slug(
        &pool,
        &NewProduct {
            slug: "acme-oxford-shirt",
            name: "Oxford Shirt",
            description: None,
            brand_id: None,
            category_id: None,
            gender: None,
            image_path: None,
            is_available: true,
        },
    )
    .await
    .expect("product failed");

    add_product_option(&pool, product.id, "color", "navy")
        .await
        .expect("option failed");
    add_product_option(&pool, product.id, "color", "navy")
        .await
        .expect("replay failed");
    add_product_option(&pool, product.id, "pattern", "striped")
        .await
        .expect("option failed");

    let options = list_product_options(&pool, product.id)
        .await
        .expect("listing failed");
    assert_eq!(
        options,
        vec![
            ("color".to_string(), "navy".to_string()),
            ("pattern".to_string(), "striped".to_string()),
        ]
    );
}
