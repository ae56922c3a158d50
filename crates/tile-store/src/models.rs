//! Persisted records for tiles and collection requests.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use curator_common::{Geometry, Product, Ring};

/// A request to collect imagery over an extent and date range.
///
/// Created via the HTTP endpoint; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRequest {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub extent: Geometry,
    pub is_accepted: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a satellite image tile.
#[derive(Debug, Clone)]
pub struct NewTile {
    pub product: Product,
    pub tile_id: String,
    pub date: NaiveDate,
    pub boundary: Ring,
    pub catalog_data: Value,
    pub to_be_downloaded: bool,
    pub collection_id: Uuid,
}

/// One satellite imagery product unit covering a footprint on a given date.
///
/// The boundary is always a single polygon ring, whatever geometry encoding
/// the catalog used. Download bookkeeping fields are mutated in place and
/// written back via [`crate::TileStore::save_tile`].
#[derive(Debug, Clone)]
pub struct TileRecord {
    pub id: i64,
    pub product: Product,
    pub tile_id: String,
    pub date: NaiveDate,
    pub boundary: Ring,
    pub catalog_data: Value,
    pub to_be_downloaded: bool,
    pub dl_attempts: u32,
    pub dl_start_time: Option<DateTime<Utc>>,
    pub dl_end_time: Option<DateTime<Utc>>,
    pub is_downloaded: bool,
    pub extracted_path: Option<PathBuf>,
    pub collection_id: Uuid,
}
