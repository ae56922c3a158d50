//! Bounding box computation for catalog searches.

use serde::{Deserialize, Serialize};

use crate::geometry::Ring;

/// An axis-aligned geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// The envelope of a polygon ring: min/max over its vertices.
    ///
    /// Returns `None` for an empty ring.
    pub fn envelope(ring: &Ring) -> Option<Self> {
        let first = ring.first()?;
        let mut bbox = Self::new(first[0], first[1], first[0], first[1]);

        for &[lon, lat] in &ring[1..] {
            bbox.min_lon = bbox.min_lon.min(lon);
            bbox.min_lat = bbox.min_lat.min(lat);
            bbox.max_lon = bbox.max_lon.max(lon);
            bbox.max_lat = bbox.max_lat.max(lat);
        }

        Some(bbox)
    }

    /// Serialize as the provider's `box` query value: "lonmin,latmin,lonmax,latmax".
    pub fn to_query_value(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}
