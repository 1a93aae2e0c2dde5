//! LibreOffice headless conversion backend.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{place_output, ConvertError, ConvertResult, ConverterBackend};

/// Converts documents by shelling out to `soffice` in headless mode.
///
/// The converter writes into a per-call scratch directory; the produced
/// bytes are copied to the destination only after the process finished,
/// and the scratch directory is removed on every exit path.
pub struct LibreOfficeBackend {
    /// Path to the soffice executable (empty = find in PATH).
    soffice_path: PathBuf,
}

impl LibreOfficeBackend {
    pub fn new() -> Self {
        Self {
            soffice_path: PathBuf::new(),
        }
    }

    /// Set a custom path to the soffice executable.
    pub fn with_soffice_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.soffice_path = path.into();
        self
    }

    /// Get the soffice executable path/command.
    fn soffice_cmd(&self) -> &str {
        if self.soffice_path.as_os_str().is_empty() {
            "soffice"
        } else {
            self.soffice_path.to_str().unwrap_or("soffice")
        }
    }
}

impl Default for LibreOfficeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBackend for LibreOfficeBackend {
    fn name(&self) -> &str {
        "LibreOffice"
    }

    fn is_available(&self) -> bool {
        Command::new(self.soffice_cmd())
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn convert(&self, source: &Path, dest: &Path) -> ConvertResult<()> {
        // Dropping the guard removes the scratch directory on every exit
        // path below, including the error returns.
        let scratch = tempfile::Builder::new()
            .prefix("docpdf-")
            .tempdir()
            .map_err(|e| ConvertError::io_error("creating scratch directory", e))?;

        let soffice = self.soffice_cmd();
        tracing::debug!(
            "$ {} --headless --convert-to pdf --outdir {} {}",
            soffice,
            scratch.path().display(),
            source.display()
        );

        let output = Command::new(soffice)
            .arg("--headless")
            .arg("--norestore")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(scratch.path())
            .arg(source)
            .output()
            .map_err(|e| ConvertError::Launch {
                tool: soffice.to_string(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(ConvertError::command_failed(
                soffice,
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let stem = source.file_stem().unwrap_or_default();
        let produced = scratch.path().join(stem).with_extension("pdf");
        if !produced.exists() {
            return Err(ConvertError::MissingOutput {
                tool: soffice.to_string(),
                path: source.to_path_buf(),
            });
        }

        let bytes = fs::read(&produced)
            .map_err(|e| ConvertError::io_error("reading converted output", e))?;
        place_output(&bytes, dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_command_is_soffice() {
        let backend = LibreOfficeBackend::new();
        assert_eq!(backend.soffice_cmd(), "soffice");
    }

    #[test]
    fn custom_path_is_used() {
        let backend = LibreOfficeBackend::new().with_soffice_path("/opt/libreoffice/soffice");
        assert_eq!(backend.soffice_cmd(), "/opt/libreoffice/soffice");
    }

    #[test]
    fn nonexistent_executable_is_unavailable() {
        let backend = LibreOfficeBackend::new().with_soffice_path("/definitely/not/soffice");
        assert!(!backend.is_available());
    }
}
