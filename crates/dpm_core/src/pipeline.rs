//! Conversion pipeline that prepares every scanned file for merging.

use std::path::PathBuf;

use crate::convert::ConverterChain;
use crate::models::{FileEntry, FileStatus};

/// Progress callback type for per-file progress reporting.
///
/// Arguments: (files handled so far, total files, human-readable message)
pub type ProgressCallback = Box<dyn Fn(usize, usize, &str) + Send>;

/// Status callback type for row status changes.
///
/// Arguments: (row id, new status)
pub type StatusCallback = Box<dyn Fn(usize, FileStatus) + Send>;

/// Runs every scanned file through the converter chain, passing PDFs
/// through untouched.
pub struct ConversionPipeline {
    chain: ConverterChain,
}

impl ConversionPipeline {
    /// Create a pipeline over the given converter chain.
    pub fn new(chain: ConverterChain) -> Self {
        Self { chain }
    }

    /// Convert all files, in input order, returning the PDF paths that are
    /// available for merging.
    ///
    /// Input order is significant: it drives the progress count and the
    /// page order of the merged output. Files that are already PDFs are
    /// queued unchanged; everything else is converted to `<stem>.pdf` in
    /// its own directory. A single file's failure is reported through the
    /// callbacks and skipped, so the returned list may be a strict subset
    /// of the input (possibly empty).
    pub fn convert_all(
        &self,
        files: &[FileEntry],
        progress_cb: &ProgressCallback,
        status_cb: &StatusCallback,
    ) -> Vec<PathBuf> {
        let total = files.len();
        let mut ready = Vec::with_capacity(total);

        for (index, file) in files.iter().enumerate() {
            let done = index + 1;

            if file.is_pdf() {
                status_cb(file.id, FileStatus::Queued);
                ready.push(file.path.clone());
                progress_cb(done, total, &format!("Queued PDF: {}", file.file_name()));
                continue;
            }

            status_cb(file.id, FileStatus::Converting);
            let out_pdf = file.pdf_output_path();
            let out_name = out_pdf
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            progress_cb(
                done,
                total,
                &format!("Converting {} to {}", file.file_name(), out_name),
            );

            match self.chain.convert(&file.path, &out_pdf) {
                Ok(()) => {
                    status_cb(file.id, FileStatus::Converted);
                    ready.push(out_pdf);
                }
                Err(e) => {
                    status_cb(file.id, FileStatus::Failed);
                    progress_cb(done, total, &format!("Failed: {} ({})", file.file_name(), e));
                }
            }
        }

        ready
    }
}
