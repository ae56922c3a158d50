//! GeoJSON geometry types as they appear in catalog payloads.
//!
//! The curator only persists a single exterior ring per tile, so the main
//! operation here is [`Geometry::boundary_ring`], which collapses the
//! catalog's `Polygon`/`MultiPolygon` encodings into that ring.

use serde::{Deserialize, Serialize};

use crate::error::CuratorError;

/// A linear ring: a closed sequence of `[lon, lat]` positions.
pub type Ring = Vec<[f64; 2]>;

/// GeoJSON geometry variants seen in catalog features and request extents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: [f64; 2],
    },

    LineString {
        coordinates: Vec<[f64; 2]>,
    },

    /// Array of linear rings (first is exterior, rest are holes).
    Polygon {
        coordinates: Vec<Ring>,
    },

    /// Array of polygons, each an array of linear rings.
    MultiPolygon {
        coordinates: Vec<Vec<Ring>>,
    },
}

impl Geometry {
    /// The exterior boundary ring of this geometry.
    ///
    /// `Polygon` yields its first ring; `MultiPolygon` yields the first ring
    /// of its first polygon. Other geometry types are not valid tile
    /// boundaries.
    pub fn boundary_ring(&self) -> Result<Ring, CuratorError> {
        match self {
            Geometry::Polygon { coordinates } => coordinates
                .first()
                .cloned()
                .ok_or_else(|| CuratorError::UnexpectedGeometry("empty Polygon".to_string())),
            Geometry::MultiPolygon { coordinates } => coordinates
                .first()
                .and_then(|polygon| polygon.first())
                .cloned()
                .ok_or_else(|| {
                    CuratorError::UnexpectedGeometry("empty MultiPolygon".to_string())
                }),
            other => Err(CuratorError::UnexpectedGeometry(
                other.type_name().to_string(),
            )),
        }
    }

    /// The GeoJSON `type` tag for this geometry.
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::LineString { .. } => "LineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }

    /// Whether the geometry carries no coordinates at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point { .. } => false,
            Geometry::LineString { coordinates } => coordinates.is_empty(),
            Geometry::Polygon { coordinates } => {
                coordinates.is_empty() || coordinates[0].is_empty()
            }
            Geometry::MultiPolygon { coordinates } => {
                coordinates.is_empty()
                    || coordinates[0].is_empty()
                    || coordinates[0][0].is_empty()
            }
        }
    }
}
