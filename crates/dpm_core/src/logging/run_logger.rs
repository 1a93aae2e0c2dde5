//! Per-run logger with file and callback output.
//!
//! Each run gets its own logger that:
//! - Writes to a dedicated log file
//! - Sends messages to a GUI callback (if provided)
//! - Supports compact mode with progress filtering
//! - Maintains a tail buffer for error diagnosis

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;

use super::types::{GuiLogCallback, LogConfig, LogLevel, MessagePrefix};

/// Per-run logger with dual output (file + GUI).
pub struct RunLogger {
    /// Run name for identification.
    run_name: String,
    /// Path to log file.
    log_path: PathBuf,
    /// File writer (buffered).
    file_writer: Arc<Mutex<Option<BufWriter<File>>>>,
    /// GUI callback for sending messages.
    gui_callback: Arc<Mutex<Option<GuiLogCallback>>>,
    /// Logging configuration.
    config: LogConfig,
    /// Tail buffer for recent lines (used for error diagnosis).
    tail_buffer: Arc<Mutex<VecDeque<String>>>,
    /// Last progress value logged (for compact mode filtering).
    last_progress: Arc<Mutex<u32>>,
}

impl RunLogger {
    /// Create a new run logger.
    ///
    /// # Arguments
    /// * `run_name` - Name of the run (used in log filename)
    /// * `log_dir` - Directory to write log file to
    /// * `config` - Logging configuration
    /// * `gui_callback` - Optional callback for GUI output
    pub fn new(
        run_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        gui_callback: Option<GuiLogCallback>,
    ) -> std::io::Result<Self> {
        let run_name = run_name.into();
        let log_dir = log_dir.as_ref();

        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&run_name)));

        let file = File::create(&log_path)?;
        let file_writer = BufWriter::new(file);

        Ok(Self {
            run_name,
            log_path,
            file_writer: Arc::new(Mutex::new(Some(file_writer))),
            gui_callback: Arc::new(Mutex::new(gui_callback)),
            config,
            tail_buffer: Arc::new(Mutex::new(VecDeque::with_capacity(100))),
            last_progress: Arc::new(Mutex::new(0)),
        })
    }

    /// Get the run name.
    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// Get the log file path.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        let formatted = self.format_message(message);
        self.output(&formatted);
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        let msg = MessagePrefix::Warning.format(message);
        self.log(LogLevel::Warn, &msg);
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        let msg = MessagePrefix::Error.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Log a command being executed.
    pub fn command(&self, command: &str) {
        let msg = MessagePrefix::Command.format(command);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a section marker.
    pub fn section(&self, section_name: &str) {
        let msg = MessagePrefix::Section.format(section_name);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a success message.
    pub fn success(&self, message: &str) {
        let msg = MessagePrefix::Success.format(message);
        self.log(LogLevel::Info, &msg);
    }

    /// Log progress update (filtered in compact mode).
    ///
    /// Returns true if the progress was logged, false if filtered.
    pub fn progress(&self, percent: u32) -> bool {
        if self.config.compact {
            let mut last = self.last_progress.lock();
            let step = self.config.progress_step.max(1);

            // Only log at step intervals (e.g. 0%, 20%, 40%, ...)
            let current_step = (percent / step) * step;
            let last_step = (*last / step) * step;

            if current_step <= last_step && percent < 100 {
                return false;
            }
            *last = percent;
        }

        let msg = format!("Progress: {}%", percent);
        self.log(LogLevel::Info, &msg);
        true
    }

    /// Log command output line (for stdout/stderr from external tools).
    ///
    /// In compact mode, these are only added to the tail buffer.
    pub fn output_line(&self, line: &str, is_stderr: bool) {
        {
            let mut buffer = self.tail_buffer.lock();
            if buffer.len() >= self.config.error_tail {
                buffer.pop_front();
            }
            buffer.push_back(line.to_string());
        }

        if self.config.compact {
            return;
        }

        let prefix = if is_stderr { "[stderr] " } else { "" };
        let msg = format!("{}{}", prefix, line);
        self.output(&self.format_message(&msg));
    }

    /// Show the tail buffer (typically after an error).
    pub fn show_tail(&self, header: &str) {
        let buffer = self.tail_buffer.lock();
        if buffer.is_empty() {
            return;
        }

        self.output(&self.format_message(&format!("[{}/tail]", header)));
        for line in buffer.iter() {
            self.output(&self.format_message(line));
        }
    }

    /// Get the current tail buffer contents.
    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the logger and release the file handle.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    /// Format a message with timestamp (if enabled).
    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    /// Output a formatted message to file and GUI.
    fn output(&self, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
            let _ = writer.flush();
        }

        if let Some(ref callback) = *self.gui_callback.lock() {
            callback(formatted);
        }
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Replace characters that are unsafe in file names.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[test]
    fn logger_writes_to_file() {
        let dir = tempdir().unwrap();
        let logger = RunLogger::new("test run", dir.path(), LogConfig::default(), None).unwrap();

        logger.info("hello");
        logger.flush();

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("hello"));
        assert!(logger.log_path().ends_with("test_run.log"));
    }

    #[test]
    fn gui_callback_receives_messages() {
        let dir = tempdir().unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let cb_count = Arc::clone(&count);
        let callback: GuiLogCallback = Box::new(move |_| {
            cb_count.fetch_add(1, Ordering::SeqCst);
        });

        let logger =
            RunLogger::new("cb", dir.path(), LogConfig::default(), Some(callback)).unwrap();
        logger.info("one");
        logger.error("two");

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn compact_mode_filters_progress() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            compact: true,
            progress_step: 20,
            ..LogConfig::default()
        };
        let logger = RunLogger::new("progress", dir.path(), config, None).unwrap();

        assert!(logger.progress(0));
        assert!(!logger.progress(5));
        assert!(!logger.progress(19));
        assert!(logger.progress(20));
        assert!(logger.progress(100));
    }

    #[test]
    fn tail_buffer_is_bounded() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            error_tail: 3,
            ..LogConfig::default()
        };
        let logger = RunLogger::new("tail", dir.path(), config, None).unwrap();

        for i in 0..10 {
            logger.output_line(&format!("line {}", i), false);
        }

        let tail = logger.get_tail();
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0], "line 7");
        assert_eq!(tail[2], "line 9");
    }

    #[test]
    fn levels_below_threshold_are_dropped() {
        let dir = tempdir().unwrap();
        let logger = RunLogger::new("levels", dir.path(), LogConfig::default(), None).unwrap();

        logger.debug("invisible");
        logger.info("visible");
        logger.flush();

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(!content.contains("invisible"));
        assert!(content.contains("visible"));
    }
}
