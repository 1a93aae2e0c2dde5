//! DocPDF Merger - Main entry point
//!
//! Handles application-level logging initialization, configuration
//! loading, directory creation, and launching the iced application.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dpm_core::config::ConfigManager;
use dpm_core::logging::{init_tracing, LogLevel};

mod app;
mod handlers;

use app::App;

/// Default config path: .config/settings.toml (relative to current working directory)
fn default_config_path() -> PathBuf {
    PathBuf::from(".config").join("settings.toml")
}

fn main() -> iced::Result {
    // Load configuration first (needed for directory paths)
    let config_path = default_config_path();
    let mut config_manager = ConfigManager::new(&config_path);

    if let Err(e) = config_manager.load_or_create() {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
    }

    init_tracing(LogLevel::Info);

    tracing::info!("DocPDF Merger starting");
    tracing::info!("Config: {}", config_path.display());
    tracing::info!("Core version: {}", dpm_core::version());

    // Ensure all configured directories exist
    if let Err(e) = config_manager.ensure_dirs_exist() {
        tracing::error!("Failed to create directories: {}", e);
        eprintln!("Warning: Failed to create directories: {}", e);
    }

    // Wrap config in Arc<Mutex> for sharing with dialog tasks
    let config = Arc::new(Mutex::new(config_manager));

    iced::application(move || App::new(config.clone()), App::update, App::view)
        .title("DocPDF Merger")
        .subscription(App::subscription)
        .window_size(iced::Size::new(860.0, 580.0))
        .run()
}
