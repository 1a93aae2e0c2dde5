//! Converter backends that turn Office documents into PDFs.
//!
//! A backend is an external capability (a converter process or an
//! automation wrapper); this module only orchestrates it. Backends are
//! tried in a fixed preference order with fallback: the configured
//! automation command first, then headless LibreOffice. The first success
//! short-circuits; if no backend is available the chain fails with
//! [`ConvertError::NoConverterAvailable`].

mod automation;
mod soffice;

pub use automation::AutomationBackend;
pub use soffice::LibreOfficeBackend;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ConversionSettings;

/// Errors from a conversion attempt.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The converter executable could not be launched.
    #[error("Failed to launch {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The converter ran but reported failure.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// The converter reported success but produced no PDF.
    #[error("{tool} did not produce a PDF for {path}")]
    MissingOutput { tool: String, path: PathBuf },

    /// File I/O error around the conversion.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// The file's extension is not convertible.
    #[error("Unsupported extension for conversion: {0}")]
    UnsupportedExtension(String),

    /// No working backend was found.
    #[error("No converter available. Install LibreOffice or configure an automation command.")]
    NoConverterAvailable,
}

impl ConvertError {
    /// Create a command failed error.
    pub fn command_failed(
        tool: impl Into<String>,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// A capability that converts one office document into one PDF file.
pub trait ConverterBackend: Send + Sync {
    /// Backend name (for logging and error context).
    fn name(&self) -> &str;

    /// Whether the backend can run on this machine.
    fn is_available(&self) -> bool;

    /// Convert `source` into a PDF at `dest`.
    ///
    /// Implementations must clean up any scratch state before returning,
    /// success or failure, and must only place bytes at `dest` atomically
    /// so a failed attempt never leaves a partial file there.
    fn convert(&self, source: &Path, dest: &Path) -> ConvertResult<()>;
}

/// Ordered list of converter backends tried in sequence.
pub struct ConverterChain {
    backends: Vec<Box<dyn ConverterBackend>>,
}

impl ConverterChain {
    /// Create a chain from an explicit backend list.
    pub fn new(backends: Vec<Box<dyn ConverterBackend>>) -> Self {
        Self { backends }
    }

    /// Build the standard chain from settings.
    ///
    /// Preference order: the configured automation command (if any), then
    /// LibreOffice.
    pub fn from_settings(settings: &ConversionSettings) -> Self {
        let mut backends: Vec<Box<dyn ConverterBackend>> = Vec::new();
        if !settings.automation_command.trim().is_empty() {
            backends.push(Box::new(AutomationBackend::new(
                settings.automation_command.clone(),
            )));
        }
        let mut soffice = LibreOfficeBackend::new();
        if !settings.soffice_path.trim().is_empty() {
            soffice = soffice.with_soffice_path(settings.soffice_path.trim());
        }
        backends.push(Box::new(soffice));
        Self::new(backends)
    }

    /// Number of configured backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether the chain has no backends at all.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Try each available backend in order; the first success wins.
    ///
    /// A backend failure falls through to the next backend. If no backend
    /// was available to try, fails with `NoConverterAvailable`; otherwise
    /// the last backend's error is returned.
    pub fn convert(&self, source: &Path, dest: &Path) -> ConvertResult<()> {
        let ext = crate::models::dotted_lowercase_extension(source).unwrap_or_default();
        if !matches!(ext.as_str(), ".doc" | ".docx" | ".ppt" | ".pptx") {
            return Err(ConvertError::UnsupportedExtension(ext));
        }

        let mut last_error = None;

        for backend in &self.backends {
            if !backend.is_available() {
                continue;
            }
            match backend.convert(source, dest) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        "{} failed for {}: {}",
                        backend.name(),
                        source.display(),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(ConvertError::NoConverterAvailable))
    }
}

/// Place converted bytes at `dest` atomically.
///
/// Writes to a `.part` sibling first, then renames into place, so a
/// failure can never leave a truncated file at the destination path.
pub(crate) fn place_output(bytes: &[u8], dest: &Path) -> ConvertResult<()> {
    let staging = dest.with_extension("pdf.part");
    fs::write(&staging, bytes)
        .map_err(|e| ConvertError::io_error("writing converted output", e))?;
    fs::rename(&staging, dest)
        .map_err(|e| ConvertError::io_error("moving converted output into place", e))
}
