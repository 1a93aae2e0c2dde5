//! Operator-configured automation command backend.

use std::fs;
use std::path::Path;
use std::process::Command;

use super::{place_output, ConvertError, ConvertResult, ConverterBackend};

/// Runs an operator-supplied command to convert a document.
///
/// The command template is split on whitespace; `{input}` and `{output}`
/// placeholders are replaced with the source path and a scratch output
/// path. This stands in for platform office-automation wrappers on
/// systems that have one; it is disabled unless configured.
pub struct AutomationBackend {
    command: String,
}

impl AutomationBackend {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl ConverterBackend for AutomationBackend {
    fn name(&self) -> &str {
        "automation command"
    }

    fn is_available(&self) -> bool {
        !self.command.trim().is_empty()
    }

    fn convert(&self, source: &Path, dest: &Path) -> ConvertResult<()> {
        let scratch = tempfile::Builder::new()
            .prefix("docpdf-")
            .tempdir()
            .map_err(|e| ConvertError::io_error("creating scratch directory", e))?;

        let stem = source.file_stem().unwrap_or_default();
        let scratch_pdf = scratch.path().join(stem).with_extension("pdf");

        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or(ConvertError::NoConverterAvailable)?;
        let args: Vec<String> = parts
            .map(|a| {
                a.replace("{input}", &source.to_string_lossy())
                    .replace("{output}", &scratch_pdf.to_string_lossy())
            })
            .collect();

        tracing::debug!("$ {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(&args)
            .output()
            .map_err(|e| ConvertError::Launch {
                tool: program.to_string(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(ConvertError::command_failed(
                program,
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        if !scratch_pdf.exists() {
            return Err(ConvertError::MissingOutput {
                tool: program.to_string(),
                path: source.to_path_buf(),
            });
        }

        let bytes = fs::read(&scratch_pdf)
            .map_err(|e| ConvertError::io_error("reading converted output", e))?;
        place_output(&bytes, dest)
    }
}
