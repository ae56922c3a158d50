//! SQLite persistence for the sat-curator pipeline.
//!
//! Two tables: `collection_requests` created by the HTTP endpoint, and
//! `satellite_tiles` created during catalog-to-database mapping and mutated
//! by the download bookkeeping.

pub mod error;
pub mod models;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use models::{CollectionRequest, NewTile, TileRecord};
pub use store::TileStore;
