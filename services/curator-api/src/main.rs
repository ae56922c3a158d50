//! Collection-request API service.
//!
//! Accepts new imagery collection requests over HTTP and persists them for
//! the ingestion pipeline to pick up.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use curator_api::{start_server, ServerState};
use tile_store::TileStore;

#[derive(Parser, Debug)]
#[command(name = "curator-api")]
#[command(about = "HTTP API for new imagery collection requests")]
struct Args {
    /// Path of the SQLite database
    #[arg(long, env = "CURATOR_DB", default_value = "/data/curator/curator.db")]
    database: PathBuf,

    /// Port to listen on
    #[arg(long, env = "CURATOR_PORT", default_value = "8080")]
    port: u16,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
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

    info!("Starting collection-request API");

    let store = TileStore::open(&args.database).await?;
    let state = Arc::new(ServerState { store });

    start_server(state, args.port).await
}
