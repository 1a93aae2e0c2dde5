//! Folder scanning for supported document files.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{dotted_lowercase_extension, is_supported_extension, FileEntry};

/// Errors from scanning a folder.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The selected path does not exist.
    #[error("Folder not found: {0}")]
    NotFound(PathBuf),

    /// The selected path exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Reading the directory failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// List the supported files directly inside `dir`.
///
/// Does not recurse into subdirectories. Matching is case-insensitive on
/// the extension. Order follows filesystem enumeration order and is only
/// stable for a single call; row ids are assigned in that order.
pub fn list_supported_files(dir: &Path) -> ScanResult<Vec<FileEntry>> {
    if !dir.exists() {
        return Err(ScanError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let read_dir = std::fs::read_dir(dir).map_err(|e| ScanError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| ScanError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let supported = dotted_lowercase_extension(&path)
            .map(|ext| is_supported_extension(&ext))
            .unwrap_or(false);
        if supported {
            entries.push(FileEntry::new(entries.len(), path));
        }
    }

    tracing::debug!("Scanned {}: {} supported file(s)", dir.display(), entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn lists_only_supported_extensions() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "report.docx");
        touch(dir.path(), "slides.pptx");
        touch(dir.path(), "cover.pdf");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "data.csv");

        let entries = list_supported_files(dir.path()).unwrap();
        let mut names: Vec<String> = entries.iter().map(|e| e.file_name()).collect();
        names.sort();
        assert_eq!(names, vec!["cover.pdf", "report.docx", "slides.pptx"]);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "REPORT.DOCX");
        touch(dir.path(), "Cover.Pdf");

        let entries = list_supported_files(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| is_supported_extension(&e.extension)));
    }

    #[test]
    fn does_not_recurse_into_subdirectories() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("nested");
        fs::create_dir(&sub).unwrap();
        touch(&sub, "hidden.docx");
        touch(dir.path(), "top.pdf");

        let entries = list_supported_files(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name(), "top.pdf");
    }

    #[test]
    fn row_ids_follow_enumeration_order() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.pdf");
        touch(dir.path(), "b.pdf");
        touch(dir.path(), "c.pdf");

        let entries = list_supported_files(dir.path()).unwrap();
        let ids: Vec<usize> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn missing_path_is_rejected() {
        let err = list_supported_files(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, ScanError::NotFound(_)));
    }

    #[test]
    fn file_path_is_rejected() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.pdf");

        let err = list_supported_files(&dir.path().join("a.pdf")).unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }
}
