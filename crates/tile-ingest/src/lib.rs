//! Tile ingestion pipeline.
//!
//! Covers the path from a catalog search to per-band raster files on disk:
//!
//! - search the external catalog by product, date range and polygon
//! - map search results into persisted tile records
//! - download a tile's raster archive with attempt/timestamp bookkeeping
//! - extract Sentinel-2 metadata from the stored catalog payload
//! - rename extracted band files into a normalized naming scheme
//! - look up a raster's EPSG code
//!
//! Also hosts the supporting COG conversion and staging helpers used by the
//! ops CLI.

pub mod bands;
pub mod cog;
pub mod epsg;
pub mod error;
pub mod metadata;
pub mod service;
pub mod stage;

pub use bands::TargetImage;
pub use error::{IngestError, IngestResult};
pub use metadata::TileMetadata;
pub use service::{ServiceConfig, SourceData, TileService};
