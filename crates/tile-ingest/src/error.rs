//! Error types for the ingestion pipeline.

use std::path::PathBuf;

use thiserror::Error;

use curator_common::{CuratorError, Product};

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur during ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Domain(#[from] CuratorError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog_client::CatalogError),

    #[error("Store error: {0}")]
    Store(#[from] tile_store::StoreError),

    #[error("Feature is missing property: {0}")]
    MissingProperty(String),

    #[error("Tile {0} has no extracted path")]
    MissingExtractedPath(i64),

    #[error("No extraction logic implemented for product {0}")]
    Unimplemented(Product),

    #[error("Raster {0} carries no CRS geokey")]
    MissingCrs(PathBuf),

    #[error("Failed to read raster: {0}")]
    Raster(#[from] tiff::TiffError),

    #[error("{program} exited with {status}")]
    Subprocess {
        program: String,
        status: std::process::ExitStatus,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
