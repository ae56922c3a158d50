//! EPSG code lookup for extracted raster files.
//!
//! Workaround: the Sentinel EPSG code is only readable after extraction, so
//! this opens the raster directly. Goes away once image extraction moves
//! ahead of metadata reading in the pipeline.

use std::fs::File;
use std::path::Path;

use tiff::decoder::Decoder;
use tiff::tags::Tag;
use tracing::debug;

use crate::error::{IngestError, IngestResult};

// GeoTIFF tag and key IDs (not in the standard tiff crate)
const GEOTIFF_GEOKEYDIRECTORY: u16 = 34735;
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;

/// Read a raster's coordinate reference system as an EPSG code string.
pub fn find_epsg(target_image_path: &Path) -> IngestResult<String> {
    let file = File::open(target_image_path)?;
    let mut decoder = Decoder::new(file)?;

    let directory = decoder
        .get_tag_u16_vec(Tag::Unknown(GEOTIFF_GEOKEYDIRECTORY))
        .map_err(|_| IngestError::MissingCrs(target_image_path.to_path_buf()))?;

    let code = epsg_from_geokeys(&directory)
        .ok_or_else(|| IngestError::MissingCrs(target_image_path.to_path_buf()))?;

    debug!(path = %target_image_path.display(), epsg = code, "Read raster CRS");

    Ok(code.to_string())
}

/// Extract the CRS code from a GeoKeyDirectory.
///
/// The directory is a header of four shorts followed by entries of four
/// shorts each: (key id, tag location, count, value). A projected CRS key
/// wins over a geographic one when both are present.
fn epsg_from_geokeys(directory: &[u16]) -> Option<u16> {
    if directory.len() < 4 {
        return None;
    }

    let mut geographic = None;
    for entry in directory[4..].chunks_exact(4) {
        let (key_id, location, value) = (entry[0], entry[1], entry[3]);
        // Location 0 means the value lives in the entry itself.
        if location != 0 {
            continue;
        }
        match key_id {
            PROJECTED_CS_TYPE_GEO_KEY => return Some(value),
            GEOGRAPHIC_TYPE_GEO_KEY => geographic = Some(value),
            _ => {}
        }
    }

    geographic
}
