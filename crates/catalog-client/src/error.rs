//! Error types for catalog operations.

use thiserror::Error;

/// Result type alias using CatalogError.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Feature {0} has no download location")]
    MissingDownloadUrl(String),

    #[error("Deserialized collection is empty")]
    EmptyResults,

    #[error("Failed to read serialized collection: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed feature collection: {0}")]
    Json(#[from] serde_json::Error),
}
