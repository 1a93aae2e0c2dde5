//! Run lifecycle handlers: start, output selection, polling, completion.

use std::path::{Path, PathBuf};

use iced::Task;

use dpm_core::models::FileStatus;
use dpm_core::scan;
use dpm_core::worker::{ProgressEvent, Worker};

use crate::app::{App, Message};

impl App {
    /// Validate inputs, then prompt for the output path.
    ///
    /// A new run may not start while one is active; the start button is
    /// disabled during a run, and this guard covers queued messages.
    pub fn handle_start(&mut self) -> Task<Message> {
        if self.is_processing {
            return Task::none();
        }

        let folder = self.folder_path.trim().to_string();
        if folder.is_empty() {
            self.status_text = "Please select a valid folder.".to_string();
            return Task::none();
        }

        // Re-scan so the run sees the folder's current contents.
        match scan::list_supported_files(Path::new(&folder)) {
            Ok(files) if files.is_empty() => {
                self.files.clear();
                self.status_text =
                    "No supported files found in the selected folder.".to_string();
                Task::none()
            }
            Ok(files) => {
                self.files = files;

                let default_dir = {
                    let cfg = self.config.lock().unwrap();
                    cfg.settings().paths.output_folder.clone()
                };

                Task::perform(
                    async move {
                        rfd::AsyncFileDialog::new()
                            .set_title("Save merged PDF as")
                            .set_directory(default_dir)
                            .set_file_name("merged.pdf")
                            .add_filter("PDF files", &["pdf"])
                            .save_file()
                            .await
                            .map(|f| f.path().to_path_buf())
                    },
                    Message::OutputSelected,
                )
            }
            Err(e) => {
                self.files.clear();
                self.status_text = e.to_string();
                Task::none()
            }
        }
    }

    /// Output path picked; spawn the background run.
    pub fn handle_output_selected(&mut self, path: Option<PathBuf>) -> Task<Message> {
        let Some(mut output_path) = path else {
            self.status_text = "Ready.".to_string();
            return Task::none();
        };

        // Default to a .pdf extension when the user omits it.
        let has_pdf_ext = output_path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !has_pdf_ext {
            output_path.set_extension("pdf");
        }

        let settings = {
            let cfg = self.config.lock().unwrap();
            cfg.settings().clone()
        };

        match Worker::new(settings).spawn(self.files.clone(), output_path) {
            Ok(handle) => {
                self.run = Some(handle);
                self.is_processing = true;
                self.progress = 0.0;
                self.status_text =
                    "Processing... Converting files, then merging to a single PDF.".to_string();
            }
            Err(e) => {
                tracing::error!("Failed to spawn worker: {}", e);
                self.status_text = format!("Failed to start: {}", e);
            }
        }

        Task::none()
    }

    /// Drain the event channel; called on every timer tick while processing.
    ///
    /// The drain never blocks: `try_iter` returns immediately when the
    /// channel is empty.
    pub fn handle_poll(&mut self) -> Task<Message> {
        let events: Vec<ProgressEvent> = match self.run {
            Some(ref run) => run.events.try_iter().collect(),
            None => Vec::new(),
        };

        for event in events {
            match event {
                ProgressEvent::Progress {
                    current,
                    total,
                    message,
                } => {
                    self.progress = current as f32 / total.max(1) as f32;
                    self.status_text = message;
                }
                ProgressEvent::RowStatus { file_id, status } => {
                    if let Some(file) = self.files.iter_mut().find(|f| f.id == file_id) {
                        file.status = status;
                    }
                }
                ProgressEvent::Stage { message } => {
                    self.status_text = message;
                }
                ProgressEvent::Done { output_path } => {
                    self.finish_run(Ok(output_path));
                }
                ProgressEvent::Error { message } => {
                    self.finish_run(Err(message));
                }
            }
        }

        Task::none()
    }

    /// Apply a terminal event and re-enable the start/clear actions.
    fn finish_run(&mut self, result: Result<PathBuf, String>) {
        self.is_processing = false;
        self.run = None;

        match result {
            Ok(output_path) => {
                self.progress = 1.0;
                // Only rows that survived the pipeline took part in the
                // merge; failed rows keep their Failed status.
                for file in &mut self.files {
                    if file.status != FileStatus::Failed {
                        file.status = FileStatus::Merged;
                    }
                }
                self.status_text = format!("Completed. PDF saved to: {}", output_path.display());
                tracing::info!("Run completed: {}", output_path.display());
            }
            Err(message) => {
                self.status_text = format!("Failed: {}", message);
                tracing::error!("Run failed: {}", message);
            }
        }
    }

    /// Reset the folder selection and table.
    pub fn handle_clear(&mut self) -> Task<Message> {
        if self.is_processing {
            return Task::none();
        }

        self.folder_path.clear();
        self.files.clear();
        self.progress = 0.0;
        self.status_text = "Ready.".to_string();
        Task::none()
    }
}
