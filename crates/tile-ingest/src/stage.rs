//! Staging helpers: directory creation with explicit permissions and
//! fixed-list file copies.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::IngestResult;

/// Create a directory tree and apply the given Unix permission bits.
///
/// Warns and leaves permissions untouched when the directory already exists.
pub fn create_folder(folder: &Path, mode: u32) -> IngestResult<()> {
    if folder.exists() {
        warn!(path = %folder.display(), "Folder already exists");
        return Ok(());
    }

    std::fs::create_dir_all(folder)?;
    std::fs::set_permissions(folder, std::fs::Permissions::from_mode(mode))?;

    info!(path = %folder.display(), mode = format!("{:o}", mode), "Folder created");

    Ok(())
}

/// Copy each existing regular file into `destination`.
///
/// Missing sources are warned about and skipped. Returns the paths of the
/// copies that were made.
pub fn copy_files(sources: &[PathBuf], destination: &Path) -> IngestResult<Vec<PathBuf>> {
    let mut copied = Vec::new();

    for source in sources {
        if !source.is_file() {
            warn!(path = %source.display(), "File does not exist and was not copied");
            continue;
        }

        let file_name = source
            .file_name()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"))?;
        let target = destination.join(file_name);

        std::fs::copy(source, &target)?;
        info!(from = %source.display(), to = %target.display(), "File copied");

        copied.push(target);
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_folder_applies_mode() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("staging");

        create_folder(&target, 0o755).unwrap();

        assert!(target.is_dir());
        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_create_existing_folder_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        create_folder(dir.path(), 0o700).unwrap();
    }

    #[test]
    fn test_copy_skips_missing_sources() {
        let src_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();

        let present = src_dir.path().join("present.txt");
        std::fs::write(&present, b"data").unwrap();
        let missing = src_dir.path().join("missing.txt");

        let copied = copy_files(&[present, missing], dest_dir.path()).unwrap();

        assert_eq!(copied, vec![dest_dir.path().join("present.txt")]);
        assert!(dest_dir.path().join("present.txt").is_file());
        assert!(!dest_dir.path().join("missing.txt").exists());
    }
}
