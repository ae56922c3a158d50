//! Metadata extraction from stored catalog payloads.
//!
//! Field names mirror the downstream business-metadata contract, so the
//! serialized form must keep its capitalized keys.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use curator_common::{CuratorError, Geometry, Product, Ring};
use tile_store::TileRecord;

use crate::error::IngestResult;

/// Metadata for one tile, copied verbatim from the catalog properties.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct TileMetadata {
    #[serde(rename = "Extent")]
    pub extent: Option<Ring>,
    #[serde(rename = "Keywords")]
    pub keywords: Option<Value>,
    #[serde(rename = "CloudCover")]
    pub cloud_cover: Option<f64>,
    #[serde(rename = "OrganizationName")]
    pub organization_name: Option<String>,
    #[serde(rename = "ProcessingLevel")]
    pub processing_level: Option<String>,
    #[serde(rename = "Abstract")]
    pub abstract_: Option<String>,
    #[serde(rename = "SensorMode")]
    pub sensor_mode: Option<String>,
    #[serde(rename = "SensorType")]
    pub sensor_type: Option<String>,
    #[serde(rename = "ProductType")]
    pub product_type: Option<String>,
    #[serde(rename = "PlatformIdentifier")]
    pub platform_identifier: Option<String>,
    #[serde(rename = "Identifier")]
    pub identifier: Option<String>,
    #[serde(rename = "LicenseBasedConstraints")]
    pub license: Option<String>,
    #[serde(rename = "PlatformName")]
    pub platform_name: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Resolution")]
    pub resolution: Option<f64>,
}

/// Extract metadata from a tile's stored catalog payload.
///
/// Only the Sentinel-2 family has extraction logic; other products fail
/// with an unsupported-product error.
pub fn extract(tile: &TileRecord) -> IngestResult<TileMetadata> {
    if tile.product != Product::Sentinel2 {
        return Err(CuratorError::UnsupportedProduct(tile.product).into());
    }

    // An unexpected geometry type leaves the extent unset rather than
    // failing the whole extraction.
    let extent = match tile.catalog_data.get("geometry") {
        Some(geometry_value) => match serde_json::from_value::<Geometry>(geometry_value.clone())
        {
            Ok(geometry) => match geometry.boundary_ring() {
                Ok(ring) => Some(ring),
                Err(_) => {
                    warn!(
                        tile_id = %tile.tile_id,
                        geometry = geometry.type_name(),
                        "Invalid geometry type for metadata extent"
                    );
                    None
                }
            },
            Err(e) => {
                warn!(tile_id = %tile.tile_id, error = %e, "Unparseable geometry");
                None
            }
        },
        None => None,
    };

    let empty = Value::Null;
    let properties = tile.catalog_data.get("properties").unwrap_or(&empty);

    let str_prop = |key: &str| {
        properties
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let num_prop = |key: &str| properties.get(key).and_then(Value::as_f64);

    let metadata = TileMetadata {
        extent,
        keywords: properties.get("keywords").cloned().filter(|v| !v.is_null()),
        cloud_cover: num_prop("cloudCover"),
        organization_name: str_prop("organisationName"),
        processing_level: str_prop("processingLevel"),
        abstract_: str_prop("abstract"),
        sensor_mode: str_prop("sensorMode"),
        sensor_type: str_prop("sensorType"),
        product_type: str_prop("productType"),
        platform_identifier: str_prop("platformSerialIdentifier"),
        identifier: str_prop("parentIdentifier"),
        license: str_prop("license"),
        platform_name: str_prop("platform"),
        title: str_prop("title"),
        resolution: num_prop("resolution"),
    };

    debug!(tile_id = %tile.tile_id, "Fetched tile metadata");

    Ok(metadata)
}
