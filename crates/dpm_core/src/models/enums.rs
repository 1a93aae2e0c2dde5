//! Core enums used throughout the application.

use serde::{Deserialize, Serialize};

/// Processing status of a scanned file within one run.
///
/// Transitions are monotonic: `Ready` moves to `Queued` (PDF passthrough)
/// or `Converting`, then to `Converted` or `Failed`. `Merged` is applied
/// only after the whole run succeeded, and never to a `Failed` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FileStatus {
    /// Scanned, not yet part of a run.
    #[default]
    Ready,
    /// Already a PDF, queued for merging as-is.
    Queued,
    /// Conversion in progress.
    Converting,
    /// Conversion produced a PDF.
    Converted,
    /// Conversion failed; the file is excluded from the merge.
    Failed,
    /// Part of the successfully merged output.
    Merged,
}

impl FileStatus {
    /// Display name shown in the file table.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Queued => "Queued",
            Self::Converting => "Converting",
            Self::Converted => "Converted",
            Self::Failed => "Failed",
            Self::Merged => "Merged",
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_serde() {
        let json = serde_json::to_string(&FileStatus::Converting).unwrap();
        assert_eq!(json, "\"Converting\"");

        let status: FileStatus = serde_json::from_str("\"Merged\"").unwrap();
        assert_eq!(status, FileStatus::Merged);
    }

    #[test]
    fn default_status_is_ready() {
        assert_eq!(FileStatus::default(), FileStatus::Ready);
    }
}
