//! Command line entry point for the modfeed pipeline.
//!
//! One binary hosts all the process groups: scheduled feed ingest, the two
//! queue workers, and the operator commands (seeding, curation backlog,
//! vendor linking, retention purge). Processes coordinate only through the
//! database.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "modfeed-cli")]
#[command(about = "Product feed ingestion and catalog import pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run pending database migrations
    Migrate,
    /// Seed vendors and alias groups from the YAML config files
    Seed,
    /// Ingest a feed snapshot file for one vendor
    Ingest {
        /// Vendor slug, matching vendors.slug
        #[arg(long)]
        vendor: String,
        /// JSON-lines snapshot file of scraped items
        #[arg(long)]
        file: PathBuf,
        /// Treat the file as a partial feed: skip the missing-item sweep
        #[arg(long)]
        partial: bool,
    },
    /// Run the parse-queue worker until stopped
    ParseWorker,
    /// Run the import-queue worker until stopped
    ImportWorker,
    /// List the curation backlog of unmapped brand/category values
    Mappings {
        /// Filter by kind: brand or category
        #[arg(long)]
        kind: Option<String>,
        /// Filter by vendor slug
        #[arg(long)]
        vendor: Option<String>,
    },
    /// Wire a feed vendor to its catalog vendor, creating it if needed
    LinkVendor {
        /// Vendor slug, matching vendors.slug
        #[arg(long)]
        vendor: String,
        /// Catalog vendor display name
        #[arg(long)]
        name: String,
    },
    /// Delete long-dropped import records and expired change-cache entries
    Purge {
        /// Override the configured retention window, in days
        #[arg(long)]
        older_than_days: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = modfeed_core::load_app_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let pool = modfeed_db::connect_pool(
        &config.database_url,
        modfeed_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match cli.command {
        Commands::Migrate => {
            modfeed_db::run_migrations(&pool).await?;
            println!("migrations applied");
        }
        Commands::Seed => commands::run_seed(&pool, &config).await?,
        Commands::Ingest {
            vendor,
            file,
            partial,
        } => commands::run_ingest(&pool, &config, &vendor, &file, partial).await?,
        Commands::ParseWorker => modfeed_parser::run_parse_worker(&pool, &config).await?,
        Commands::ImportWorker => modfeed_importer::run_import_worker(&pool, &config).await?,
        Commands::Mappings { kind, vendor } => {
            commands::run_mappings(&pool, kind.as_deref(), vendor.as_deref()).await?;
        }
        Commands::LinkVendor { vendor, name } => {
            commands::run_link_vendor(&pool, &vendor, &name).await?;
        }
        Commands::Purge { older_than_days } => {
            commands::run_purge(&pool, older_than_days.unwrap_or(config.purge_after_days)).await?;
        }
    }

    Ok(())
}
