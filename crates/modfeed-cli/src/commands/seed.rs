use modfeed_core::AppConfig;

/// Upserts vendors and alias groups from the YAML config files.
///
/// # Errors
///
/// Returns an error if either file fails to load/validate or a database
/// write fails.
pub(crate) async fn run_seed(pool: &sqlx::PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let vendors = modfeed_core::load_vendors(&config.vendors_path)?;
    let aliases = modfeed_core::load_alias_seeds(&config.aliases_path)?;

    let vendor_count = modfeed_db::seed_vendors(pool, &vendors.vendors).await?;
    let alias_count = modfeed_db::seed_alias_groups(pool, &aliases).await?;

    println!("seeded {vendor_count} vendors, {alias_count} alias groups");
    Ok(())
}
