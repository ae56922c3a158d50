//! Client for the external satellite product catalog.
//!
//! The catalog indexes available satellite products by geometry, date and
//! product type. This crate covers the three gateway operations the curator
//! relies on:
//!
//! - search by bounding box and date range
//! - download a product archive (non-extracting)
//! - serialize/deserialize feature collections through files
//!
//! The provider contract is assumed stable and is not reimplemented here.

pub mod catalog;
pub mod config;
pub mod error;
pub mod features;

pub use catalog::{Catalog, HttpCatalog};
pub use config::ProviderConfig;
pub use error::{CatalogError, CatalogResult};
pub use features::{Feature, FeatureCollection};
