//! Cloud-Optimized GeoTIFF conversion via `gdal_translate`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{IngestError, IngestResult};

/// Creation options passed to `gdal_translate -of COG`.
const CREATION_OPTIONS: &[&str] = &[
    "PREDICTOR=2",
    "BIGTIFF=YES",
    "NUM_THREADS=ALL_CPUS",
    "BLOCKSIZE=128",
];

/// Sidecar extensions that may accompany a raster, by raster extension.
pub fn default_sidecars() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        (".img", vec![".ige", ".tif.aux.xml", ".rrd", ".rde"]),
        (".tif", vec![".tfw"]),
    ]
}

/// The sidecar files that actually exist next to `input`.
///
/// Absent candidates are logged and skipped.
pub fn sidecar_files(input: &Path, pairs: &[(&str, Vec<&str>)]) -> Vec<PathBuf> {
    let file_name = match input.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return Vec::new(),
    };

    let extension = match file_name.rfind('.') {
        Some(idx) => &file_name[idx..],
        None => return Vec::new(),
    };

    let candidates = pairs
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, exts)| exts.as_slice())
        .unwrap_or(&[]);

    let mut existing = Vec::new();
    for pair_ext in candidates {
        let stem = &file_name[..file_name.len() - extension.len()];
        let pair_path = input.with_file_name(format!("{}{}", stem, pair_ext));

        if pair_path.exists() {
            existing.push(pair_path);
        } else {
            warn!(path = %pair_path.display(), "Optional pair file not found, ignoring");
        }
    }

    existing
}

/// Convert a raster into a Cloud-Optimized GeoTIFF.
///
/// Spawns `gdal_translate` with the fixed creation options and waits for it
/// to finish.
pub async fn generate_cog(input: &Path, output: &Path) -> IngestResult<()> {
    let mut command = Command::new("gdal_translate");
    command.arg("-of").arg("COG");
    for option in CREATION_OPTIONS {
        command.arg("-co").arg(option);
    }
    command.arg(input).arg(output);

    let started = Instant::now();
    let status = command.status().await?;

    if !status.success() {
        return Err(IngestError::Subprocess {
            program: "gdal_translate".to_string(),
            status,
        });
    }

    info!(
        output = %output.display(),
        elapsed_secs = format!("{:.2}", started.elapsed().as_secs_f64()),
        "COG generation completed"
    );

    Ok(())
}
