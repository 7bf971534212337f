use modfeed_db::MappingKind;

/// Prints the curation backlog: raw brand/category values still waiting
/// for a canonical target.
///
/// # Errors
///
/// Returns an error on an unknown kind/vendor filter or a query failure.
pub(crate) async fn run_mappings(
    pool: &sqlx::PgPool,
    kind: Option<&str>,
    vendor_slug: Option<&str>,
) -> anyhow::Result<()> {
    let kind = match kind {
        None => None,
        Some("brand") => Some(MappingKind::Brand),
        Some("category") => Some(MappingKind::Category),
        Some(other) => anyhow::bail!("unknown mapping kind {other:?}; use brand or category"),
    };
    let vendor_id = match vendor_slug {
        None => None,
        Some(slug) => Some(
            modfeed_db::get_vendor_by_slug(pool, slug)
                .await?
                .ok_or_else(|| anyhow::anyhow!("unknown vendor slug {slug:?}"))?
                .id,
        ),
    };

    let backlog = modfeed_db::list_unmapped_mappings(pool, kind, vendor_id).await?;
    if backlog.is_empty() {
        println!("curation backlog is empty");
        return Ok(());
    }

    println!("{} unmapped values:", backlog.len());
    for row in backlog {
        println!("  [{}] vendor {} {:?}", row.kind, row.vendor_id, row.raw_value);
    }
    Ok(())
}

/// Wires a feed vendor to its catalog vendor, get-or-creating the catalog
/// row by display name.
///
/// # Errors
///
/// Returns an error if the vendor slug is unknown or a write fails.
pub(crate) async fn run_link_vendor(
    pool: &sqlx::PgPool,
    vendor_slug: &str,
    catalog_name: &str,
) -> anyhow::Result<()> {
    let vendor = modfeed_db::get_vendor_by_slug(pool, vendor_slug)
        .await?
        .ok_or_else(|| anyhow::anyhow!("unknown vendor slug {vendor_slug:?}"))?;

    let catalog_vendor_id = modfeed_db::get_or_create_vendor(pool, catalog_name).await?;
    modfeed_db::link_catalog_vendor(pool, vendor.id, catalog_vendor_id).await?;

    println!("{vendor_slug} -> catalog vendor {catalog_vendor_id} ({catalog_name})");
    Ok(())
}
