//! Folder selection handlers.

use std::path::{Path, PathBuf};

use iced::Task;

use dpm_core::config::ConfigSection;
use dpm_core::scan;

use crate::app::{App, Message};

impl App {
    /// Open the folder picker.
    pub fn browse_folder(&self) -> Task<Message> {
        Task::perform(
            async {
                rfd::AsyncFileDialog::new()
                    .set_title("Select a folder of documents")
                    .pick_folder()
                    .await
                    .map(|f| f.path().to_path_buf())
            },
            Message::FolderSelected,
        )
    }

    /// A folder was picked (or the dialog was cancelled).
    pub fn handle_folder_selected(&mut self, path: Option<PathBuf>) -> Task<Message> {
        let Some(path) = path else {
            return Task::none();
        };

        self.folder_path = path.to_string_lossy().to_string();
        self.rescan_folder();

        // Remember the folder for next launch.
        {
            let mut cfg = self.config.lock().unwrap();
            cfg.settings_mut().paths.last_input_folder = self.folder_path.clone();
            if let Err(e) = cfg.update_section(ConfigSection::Paths) {
                tracing::warn!("Failed to save last folder: {}", e);
            }
        }

        Task::none()
    }

    /// Scan the current folder and refresh the table.
    pub(crate) fn rescan_folder(&mut self) {
        match scan::list_supported_files(Path::new(&self.folder_path)) {
            Ok(files) => {
                self.status_text = format!("Found {} supported file(s).", files.len());
                self.files = files;
            }
            Err(e) => {
                self.files.clear();
                self.status_text = e.to_string();
            }
        }
        self.progress = 0.0;
    }
}
