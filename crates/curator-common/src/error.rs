//! Error types shared across sat-curator crates.

use thiserror::Error;

use crate::product::Product;

/// Result type alias using CuratorError.
pub type CuratorResult<T> = Result<T, CuratorError>;

/// Errors raised by the shared domain types.
#[derive(Debug, Error)]
pub enum CuratorError {
    #[error("Unsupported product: {0}")]
    UnsupportedProduct(Product),

    #[error("Unknown product name: {0}")]
    UnknownProductName(String),

    #[error("Unexpected geometry type: {0}")]
    UnexpectedGeometry(String),

    #[error("Invalid acquisition timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Extent has empty coordinates.")]
    EmptyExtent,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
