//! Error types for the tile store.

use thiserror::Error;

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored row is malformed: {0}")]
    Corrupt(String),

    #[error("Tile {0} not found")]
    TileNotFound(i64),

    #[error("Collection request {0} not found")]
    RequestNotFound(uuid::Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Corrupt(format!("JSON column: {}", err))
    }
}
