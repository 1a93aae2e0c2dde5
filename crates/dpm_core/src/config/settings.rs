//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Converter backend settings.
    #[serde(default)]
    pub conversion: ConversionSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            paths: PathSettings::default(),
            conversion: ConversionSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    /// Folder for per-run log files.
    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.paths.logs_folder)
    }
}

/// Path configuration for output and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Default folder offered when picking the merged output file.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Last folder the user picked.
    #[serde(default)]
    pub last_input_folder: String,
}

fn default_output_folder() -> String {
    "merged_output".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            logs_folder: default_logs_folder(),
            last_input_folder: String::new(),
        }
    }
}

/// Converter backend configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionSettings {
    /// Path to the soffice executable (empty = find in PATH).
    #[serde(default)]
    pub soffice_path: String,

    /// Automation command template with `{input}`/`{output}` placeholders,
    /// tried before LibreOffice (empty = disabled).
    #[serde(default)]
    pub automation_command: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of error lines to show in tail.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Show timestamps in log output.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_timestamps: true,
        }
    }
}

/// Identifies one top-level section for atomic section-level updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Conversion,
    Logging,
}

impl ConfigSection {
    /// TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Paths => "paths",
            Self::Conversion => "conversion",
            Self::Logging => "logging",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.paths.output_folder, "merged_output");
        assert!(settings.conversion.soffice_path.is_empty());
        assert!(settings.logging.compact);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: Settings = toml::from_str("[paths]\noutput_folder = \"out\"\n").unwrap();
        assert_eq!(settings.paths.output_folder, "out");
        assert_eq!(settings.paths.logs_folder, ".logs");
        assert_eq!(settings.logging.error_tail, 20);
    }

    #[test]
    fn section_table_names_match() {
        assert_eq!(ConfigSection::Paths.table_name(), "paths");
        assert_eq!(ConfigSection::Conversion.table_name(), "conversion");
        assert_eq!(ConfigSection::Logging.table_name(), "logging");
    }
}
