//! Main application state and view.
//!
//! The UI thread owns the file table and the processing flag; the worker
//! thread never touches them. While a run is active, a timer subscription
//! drains the worker's event channel and applies each event here.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use iced::widget::{button, column, container, progress_bar, row, scrollable, text, text_input};
use iced::{Element, Length, Subscription, Task};

use dpm_core::config::ConfigManager;
use dpm_core::models::{FileEntry, SUPPORTED_EXTENSIONS};
use dpm_core::worker::RunHandle;

/// Poll interval for draining the worker event channel.
const POLL_INTERVAL: Duration = Duration::from_millis(120);

/// All messages the application can receive.
#[derive(Debug, Clone)]
pub enum Message {
    // Folder selection
    FolderInputChanged(String),
    BrowseFolder,
    FolderSelected(Option<PathBuf>),

    // Run lifecycle
    Start,
    OutputSelected(Option<PathBuf>),
    Clear,

    // Worker polling
    Poll,
}

/// Application state, owned by the UI thread.
pub struct App {
    pub config: Arc<Mutex<ConfigManager>>,
    pub folder_path: String,
    pub files: Vec<FileEntry>,
    pub status_text: String,
    pub progress: f32,
    pub is_processing: bool,
    pub run: Option<RunHandle>,
}

impl App {
    pub fn new(config: Arc<Mutex<ConfigManager>>) -> (Self, Task<Message>) {
        let folder_path = {
            let cfg = config.lock().unwrap();
            cfg.settings().paths.last_input_folder.clone()
        };

        let app = Self {
            config,
            folder_path,
            files: Vec::new(),
            status_text: "Ready.".to_string(),
            progress: 0.0,
            is_processing: false,
            run: None,
        };
        (app, Task::none())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::FolderInputChanged(path) => {
                self.folder_path = path;
                Task::none()
            }
            Message::BrowseFolder => self.browse_folder(),
            Message::FolderSelected(path) => self.handle_folder_selected(path),
            Message::Start => self.handle_start(),
            Message::OutputSelected(path) => self.handle_output_selected(path),
            Message::Clear => self.handle_clear(),
            Message::Poll => self.handle_poll(),
        }
    }

    /// Poll the worker only while a run is active; the timer stops once
    /// the terminal event has been observed.
    pub fn subscription(&self) -> Subscription<Message> {
        if self.is_processing {
            iced::time::every(POLL_INTERVAL).map(|_| Message::Poll)
        } else {
            Subscription::none()
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let idle = !self.is_processing;

        let header = column![
            text("DocPDF Merger").size(24),
            text("Convert & merge Office files into a single PDF - fully offline").size(13),
        ]
        .spacing(2);

        let folder_row = row![
            text_input("Choose a folder...", &self.folder_path)
                .on_input(Message::FolderInputChanged)
                .width(Length::Fill),
            button("Browse...").on_press_maybe(idle.then_some(Message::BrowseFolder)),
        ]
        .spacing(8);

        let supported = text(format!("Supported: {}", SUPPORTED_EXTENSIONS.join(", "))).size(12);

        let table_header = row![
            text("File").width(Length::Fill),
            text("Type").width(Length::Fixed(90.0)),
            text("Status").width(Length::Fixed(110.0)),
        ]
        .spacing(8);

        let mut rows = column![].spacing(4);
        for file in &self.files {
            rows = rows.push(
                row![
                    text(file.file_name()).width(Length::Fill),
                    text(file.extension.clone()).width(Length::Fixed(90.0)),
                    text(file.status.name()).width(Length::Fixed(110.0)),
                ]
                .spacing(8),
            );
        }

        let actions = row![
            button("Convert & Merge").on_press_maybe(idle.then_some(Message::Start)),
            button("Clear").on_press_maybe(idle.then_some(Message::Clear)),
        ]
        .spacing(8);

        let content = column![
            header,
            folder_row,
            supported,
            table_header,
            scrollable(rows).height(Length::Fill),
            actions,
            progress_bar(0.0..=1.0, self.progress),
            text(self.status_text.as_str()).size(13),
        ]
        .spacing(12)
        .padding(16);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}
