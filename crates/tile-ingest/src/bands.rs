//! Band-file extraction and renaming.
//!
//! Every file directly under a tile's extraction directory is renamed to
//! `{uuid}_{band}{extension}`, where the band name is the token after the
//! last underscore of the original file stem. Final filenames are therefore
//! not reproducible across runs.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::IngestResult;

/// One extracted band file after renaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetImage {
    pub path: PathBuf,
    pub band_name: String,
}

/// Derive the band name and extension from a file name.
///
/// The band is the token after the last underscore in the stem; a stem
/// without underscores is its own band name. The extension keeps its dot.
pub fn band_and_extension(file_name: &str) -> (String, String) {
    let (stem, extension) = match file_name.rfind('.') {
        Some(idx) => (&file_name[..idx], &file_name[idx..]),
        None => (file_name, ""),
    };

    let band = match stem.rsplit_once('_') {
        Some((_, band)) => band,
        None => stem,
    };

    (band.to_string(), extension.to_string())
}

/// Rename every file directly under `folder` into the normalized scheme.
///
/// A rename failure is logged and the file is dropped from the result; it
/// never fails the whole extraction.
pub fn rename_band_files(folder: &Path) -> IngestResult<Vec<TargetImage>> {
    // Snapshot the listing first: renames land in the same directory and
    // must not be walked again.
    let entries: Vec<_> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .collect();

    let mut target_images = Vec::new();

    for entry in entries {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let (band_name, extension) = band_and_extension(&file_name);

        let new_name = format!("{}_{}{}", Uuid::new_v4(), band_name, extension);
        let new_path = folder.join(&new_name);

        if let Err(e) = std::fs::rename(entry.path(), &new_path) {
            warn!(
                from = %entry.path().display(),
                to = %new_path.display(),
                error = %e,
                "Failed to rename band file"
            );
            continue;
        }

        debug!(path = %new_path.display(), band = %band_name, "Renamed band file");

        target_images.push(TargetImage {
            path: new_path,
            band_name,
        });
    }

    Ok(target_images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_from_sentinel_filename() {
        let (band, ext) = band_and_extension("T39RZH_20230107T063129_B04.jp2");
        assert_eq!(band, "B04");
        assert_eq!(ext, ".jp2");
    }

    #[test]
    fn test_band_without_underscore() {
        let (band, ext) = band_and_extension("preview.png");
        assert_eq!(band, "preview");
        assert_eq!(ext, ".png");
    }

    #[test]
    fn test_band_without_extension() {
        let (band, ext) = band_and_extension("MTD_TL");
        assert_eq!(band, "TL");
        assert_eq!(ext, "");
    }

    #[test]
    fn test_rename_direct_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("T39RZH_B02.jp2"), b"img").unwrap();
        std::fs::write(dir.path().join("T39RZH_B03.jp2"), b"img").unwrap();
        std::fs::create_dir(dir.path().join("GRANULE")).unwrap();
        std::fs::write(dir.path().join("GRANULE").join("nested_B04.jp2"), b"img").unwrap();

        let mut images = rename_band_files(dir.path()).unwrap();
        images.sort_by(|a, b| a.band_name.cmp(&b.band_name));

        let bands: Vec<_> = images.iter().map(|i| i.band_name.as_str()).collect();
        assert_eq!(bands, vec!["B02", "B03"]);

        for image in &images {
            assert!(image.path.exists());
            let name = image.path.file_name().unwrap().to_string_lossy();
            assert!(name.ends_with(&format!("_{}.jp2", image.band_name)));
        }

        // Nested file untouched
        assert!(dir.path().join("GRANULE").join("nested_B04.jp2").exists());
    }

    #[test]
    fn test_empty_folder_yields_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        assert!(rename_band_files(dir.path()).unwrap().is_empty());
    }
}
