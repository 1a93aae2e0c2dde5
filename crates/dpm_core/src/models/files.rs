//! Scanned file entries and the supported extension set.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::enums::FileStatus;

/// File extensions the application accepts (lowercase, with leading dot).
///
/// Fixed set, not user-configurable.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".doc", ".docx", ".ppt", ".pptx", ".pdf"];

/// Check whether a lowercase dotted extension (e.g. ".docx") is supported.
pub fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&ext)
}

/// One file discovered by a folder scan.
///
/// Created when a folder is scanned; the status is mutated only by the
/// UI thread in response to worker events, and the collection is discarded
/// when the selection is cleared or replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Stable row id (scan enumeration order).
    pub id: usize,
    /// Full path of the file.
    pub path: PathBuf,
    /// Lowercase extension including the dot (e.g. ".docx").
    pub extension: String,
    /// Current processing status.
    pub status: FileStatus,
}

impl FileEntry {
    /// Create an entry for `path` with the given row id.
    pub fn new(id: usize, path: PathBuf) -> Self {
        let extension = dotted_lowercase_extension(&path).unwrap_or_default();
        Self {
            id,
            path,
            extension,
            status: FileStatus::Ready,
        }
    }

    /// File name for display (lossy on non-UTF-8 paths).
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Whether the file is already a PDF.
    pub fn is_pdf(&self) -> bool {
        self.extension == ".pdf"
    }

    /// Conversion target: same directory, extension replaced with `.pdf`.
    pub fn pdf_output_path(&self) -> PathBuf {
        self.path.with_extension("pdf")
    }
}

/// Extract a lowercase extension with leading dot, if the path has one.
pub fn dotted_lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
}
