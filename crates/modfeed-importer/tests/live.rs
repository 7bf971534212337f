//! Live end-to-end tests for the import stage using `#[sqlx::test]`.

use modfeed_core::ItemFields;
use modfeed_db::VendorRow;
use modfeed_importer::import_record;
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_linked_vendor(pool: &sqlx::PgPool, slug: &str) -> VendorRow {
    let catalog_vendor_id = modfeed_db::get_or_create_vendor(pool, slug)
        .await
        .expect("catalog vendor failed");
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO vendors (slug, name, affiliate_network, catalog_vendor_id) \
         VALUES ($1, $2, 'direct', $3) RETURNING id",
    )
    .bind(slug)
    .bind(format!("Test Vendor {slug}"))
    .bind(catalog_vendor_id)
    .fetch_one(pool)
    .await
    .expect("vendor insert failed");
    modfeed_db::get_vendor(pool, id)
        .await
        .expect("get_vendor failed")
        .expect("vendor exists")
}

fn final_fields() -> ItemFields {
    ItemFields {
        name: Some("Oxford Shirt".to_string()),
        description: Some("A classic button-down.".to_string()),
        brand: Some("Acme".to_string()),
        category: Some("Shirts".to_string()),
        gender: Some("M".to_string()),
        vendor: Some("shirtonomy".to_string()),
        url: Some("https://modfeed.example/redirect/shirtonomy/shirt-1".to_string()),
        regular_price: Some(Decimal::new(129_900, 2)),
        is_discount: Some(false),
        currency: Some("SEK".to_string()),
        colors: Some(vec!["navy".to_string()]),
        patterns: Some(vec!["striped".to_string()]),
        in_stock: Some(true),
        images: Some(vec!["ab/cd/abcd.jpg".to_string()]),
        ..ItemFields::default()
    }
}

/// Creates a record whose parse already validated with `fields`.
async fn validated_record(pool: &sqlx::PgPool, vendor_id: i64, key: &str, fields: &ItemFields) -> i64 {
    let record = modfeed_db::upsert_scraped(pool, vendor_id, key, fields)
        .await
        .expect("upsert failed");
    modfeed_db::record_parse_outcome(pool, record.id, fields, true, None, None)
        .await
        .expect("outcome failed");
    record.id
}

async fn count_products(pool: &sqlx::PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM catalog_products")
        .fetch_one(pool)
        .await
        .expect("count failed")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn importing_twice_leaves_the_catalog_as_once(pool: sqlx::PgPool) {
    let vendor = insert_linked_vendor(&pool, "shirtonomy").await;
    let record_id = validated_record(&pool, vendor.id, "shirt-1", &final_fields()).await;

    import_record(&pool, record_id, true).await.expect("first import failed");
    import_record(&pool, record_id, true).await.expect("second import failed");

    assert_eq!(count_products(&pool).await, 1);

    let product = modfeed_db::find_product_by_slug(&pool, "acme-oxford-shirt")
        .await
        .expect("slug query failed")
        .expect("product exists");
    assert!(product.is_available);
    assert_eq!(product.gender.as_deref(), Some("M"));
    assert_eq!(product.image_path.as_deref(), Some("ab/cd/abcd.jpg"));
    assert!(product.brand_id.is_some());

    let offers = modfeed_db::list_offers(&pool, product.id)
        .await
        .expect("offers failed");
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].availability, -1);
    assert_eq!(offers[0].regular_price, Some(Decimal::new(129_900, 2)));

    let options = modfeed_db::list_product_options(&pool, product.id)
        .await
        .expect("options failed");
    assert_eq!(
        options,
        vec![
            ("color".to_string(), "navy".to_string()),
            ("pattern".to_string(), "striped".to_string()),
        ]
    );

    let record = modfeed_db::get_record(&pool, record_id)
        .await
        .expect("get failed")
        .expect("exists");
    assert_eq!(record.catalog_product_id, Some(product.id));
    assert!(record.imported_date.is_some());
    assert!(record.is_released);
}

#[sqlx::test(migrations = "../../migrations")]
async fn known_stock_count_flows_into_offer_availability(pool: sqlx::PgPool) {
    let vendor = insert_linked_vendor(&pool, "shirtonomy").await;
    let mut fields = final_fields();
    fields.stock = Some(3);
    let record_id = validated_record(&pool, vendor.id, "shirt-1", &fields).await;

    import_record(&pool, record_id, true).await.expect("import failed");

    let product = modfeed_db::find_product_by_slug(&pool, "acme-oxford-shirt")
        .await
        .expect("slug query failed")
        .expect("product exists");
    let offers = modfeed_db::list_offers(&pool, product.id)
        .await
        .expect("offers failed");
    assert_eq!(offers[0].availability, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn rejection_hides_a_previously_imported_product(pool: sqlx::PgPool) {
    let vendor = insert_linked_vendor(&pool, "shirtonomy").await;
    let record_id = validated_record(&pool, vendor.id, "shirt-1", &final_fields()).await;
    import_record(&pool, record_id, true).await.expect("import failed");

    // A later parse rejects the record (e.g. the feed dropped it).
    modfeed_db::record_parse_outcome(&pool, record_id, &final_fields(), false, None, None)
        .await
        .expect("outcome failed");
    import_record(&pool, record_id, false).await.expect("hide failed");

    let product = modfeed_db::find_product_by_slug(&pool, "acme-oxford-shirt")
        .await
        .expect("slug query failed")
        .expect("product still exists");
    assert!(!product.is_available);

    let offers = modfeed_db::list_offers(&pool, product.id)
        .await
        .expect("offers failed");
    assert_eq!(offers[0].availability, 0);

    // Re-validation brings the same product back, no duplicate.
    modfeed_db::record_parse_outcome(&pool, record_id, &final_fields(), true, None, None)
        .await
        .expect("outcome failed");
    import_record(&pool, record_id, true).await.expect("reimport failed");
    assert_eq!(count_products(&pool).await, 1);
    let product = modfeed_db::get_product(&pool, product.id)
        .await
        .expect("get failed")
        .expect("exists");
    assert!(product.is_available);
}

#[sqlx::test(migrations = "../../migrations")]
async fn slug_match_adopts_an_existing_product(pool: sqlx::PgPool) {
    let vendor = insert_linked_vendor(&pool, "shirtonomy").await;

    // Product already in the catalog, e.g. created from another vendor's feed.
    let existing = modfeed_db::upsert_product_by_slug(
        &pool,
        &modfeed_db::NewProduct {
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
    .expect("existing product failed");

    let record_id = validated_record(&pool, vendor.id, "shirt-1", &final_fields()).await;
    import_record(&pool, record_id, true).await.expect("import failed");

    assert_eq!(count_products(&pool).await, 1);
    let record = modfeed_db::get_record(&pool, record_id)
        .await
        .expect("get failed")
        .expect("exists");
    assert_eq!(record.catalog_product_id, Some(existing.id));

    let product = modfeed_db::get_product(&pool, existing.id)
        .await
        .expect("get failed")
        .expect("exists");
    assert_eq!(product.description.as_deref(), Some("A classic button-down."));
}

#[sqlx::test(migrations = "../../migrations")]
async fn rejected_record_without_catalog_entry_is_a_no_op(pool: sqlx::PgPool) {
    let vendor = insert_linked_vendor(&pool, "shirtonomy").await;
    let record = modfeed_db::upsert_scraped(&pool, vendor.id, "shirt-1", &final_fields())
        .await
        .expect("upsert failed");
    modfeed_db::record_parse_outcome(&pool, record.id, &final_fields(), false, None, None)
        .await
        .expect("outcome failed");

    import_record(&pool, record.id, false).await.expect("hide failed");
    assert_eq!(count_products(&pool).await, 0);
}
