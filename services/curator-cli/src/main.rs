//! Operational CLI for the sat-curator pipeline.
//!
//! Subcommands:
//! - `search` - run a catalog search over a polygon and date range
//! - `stage`  - create a staging folder and copy a file list into it
//! - `cog`    - convert a raster to Cloud-Optimized GeoTIFF

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use catalog_client::{HttpCatalog, ProviderConfig};
use curator_common::{Product, Ring};
use tile_ingest::{cog, stage, ServiceConfig, TileService};
use tile_store::TileStore;

/// Demonstration defaults matching the historical search command.
const DEFAULT_RING: &str = "[[54.3515, 24.2482], [54.3515, 24.5338], [54.6371, 24.5338], \
     [54.6371, 24.2482], [54.3515, 24.2482]]";

#[derive(Parser, Debug)]
#[command(name = "curator")]
#[command(about = "Satellite product curator operations")]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the catalog for products over a polygon
    Search {
        /// Product family to search
        #[arg(long, default_value = "sentinel-2")]
        product: Product,

        /// Start of the date range
        #[arg(long, default_value = "2023-01-01")]
        start_date: NaiveDate,

        /// End of the date range
        #[arg(long, default_value = "2023-01-10")]
        end_date: NaiveDate,

        /// Search polygon ring as a JSON array of [lon, lat] pairs
        #[arg(long, default_value = DEFAULT_RING)]
        ring: String,

        /// Provider configuration file
        #[arg(long, env = "PROVIDER_CONFIG", default_value = "config/provider.yaml")]
        provider_config: PathBuf,

        /// Path of the SQLite database
        #[arg(long, env = "CURATOR_DB", default_value = "/data/curator/curator.db")]
        database: PathBuf,

        /// Directory downloads would be written to
        #[arg(long, default_value = "/data/curator/downloads")]
        download_dir: PathBuf,
    },

    /// Create a staging folder and copy files into it
    Stage {
        /// Folder to create
        #[arg(long)]
        folder: PathBuf,

        /// Unix permission bits, octal
        #[arg(long, default_value = "755")]
        mode: String,

        /// Files to copy into the folder
        #[arg(long)]
        files: Vec<PathBuf>,
    },

    /// Convert a raster to Cloud-Optimized GeoTIFF
    Cog {
        /// Input raster
        #[arg(long)]
        input: PathBuf,

        /// Output COG path
        #[arg(long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Search {
            product,
            start_date,
            end_date,
            ring,
            provider_config,
            database,
            download_dir,
        } => {
            run_search(
                product,
                start_date,
                end_date,
                &ring,
                &provider_config,
                &database,
                download_dir,
            )
            .await
        }
        Command::Stage {
            folder,
            mode,
            files,
        } => run_stage(&folder, &mode, &files),
        Command::Cog { input, output } => run_cog(&input, &output).await,
    }
}

async fn run_search(
    product: Product,
    start_date: NaiveDate,
    end_date: NaiveDate,
    ring: &str,
    provider_config: &PathBuf,
    database: &PathBuf,
    download_dir: PathBuf,
) -> Result<()> {
    let ring: Ring = serde_json::from_str(ring).context("Invalid search ring")?;

    let config = ProviderConfig::load(provider_config).context("Failed to load provider config")?;
    let to_be_downloaded = config.to_be_downloaded;
    let catalog = HttpCatalog::new(config)?;
    let store = TileStore::open(database).await?;

    let service = TileService::new(
        catalog,
        store,
        ServiceConfig {
            to_be_downloaded,
            download_dir,
        },
    );

    let results = service
        .search_by_polygon(product, start_date, end_date, &ring)
        .await?;

    info!(count = results.features.len(), "Search completed");
    for feature in &results.features {
        println!("{}", feature.id);
    }

    Ok(())
}

fn run_stage(folder: &PathBuf, mode: &str, files: &[PathBuf]) -> Result<()> {
    let mode = u32::from_str_radix(mode, 8).context("Invalid octal mode")?;

    stage::create_folder(folder, mode)?;
    let copied = stage::copy_files(files, folder)?;

    info!(copied = copied.len(), "Staging completed");
    Ok(())
}

async fn run_cog(input: &PathBuf, output: &PathBuf) -> Result<()> {
    let pairs = cog::default_sidecars();
    let sidecars = cog::sidecar_files(input, &pairs);
    info!(count = sidecars.len(), "Available pair files");

    if let Err(e) = cog::generate_cog(input, output).await {
        error!(error = %e, "COG generation failed");
        std::process::exit(1);
    }

    Ok(())
}
