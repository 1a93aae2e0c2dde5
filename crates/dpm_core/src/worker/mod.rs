//! Background run coordination.
//!
//! One run converts every scanned file and merges the results into a
//! single PDF. The run executes on its own OS thread; the UI thread
//! observes it exclusively through the event channel and must never block
//! on it. At most one run is active at a time (enforced by the UI's
//! processing flag), and a run cannot be cancelled once started.

mod events;

pub use events::ProgressEvent;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::config::Settings;
use crate::convert::ConverterChain;
use crate::logging::{LogConfig, RunLogger};
use crate::merge::{LopdfMerger, MergeError, PdfMerger};
use crate::models::FileEntry;
use crate::pipeline::{ConversionPipeline, ProgressCallback, StatusCallback};

/// Run-level failures that terminate a run with an `Error` event.
///
/// Per-file conversion failures are absorbed by the pipeline and never
/// reach this level.
#[derive(Error, Debug)]
pub enum RunError {
    /// Every file failed conversion; there is nothing to merge.
    #[error("No files to merge.")]
    NothingToMerge,

    /// The merge step itself failed.
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Handle to a spawned run.
///
/// Dropping the handle does not stop the run; there is no cancellation.
pub struct RunHandle {
    /// Event stream for this run. Drain with `try_recv`/`try_iter` from a
    /// UI timer; never block on it.
    pub events: Receiver<ProgressEvent>,
    /// The worker thread, joinable after the terminal event was observed.
    pub thread: JoinHandle<()>,
}

/// Coordinates one convert-then-merge run on a background thread.
pub struct Worker {
    pipeline: ConversionPipeline,
    merger: Box<dyn PdfMerger>,
    settings: Settings,
}

impl Worker {
    /// Build a worker with the standard converter chain and merger.
    pub fn new(settings: Settings) -> Self {
        let chain = ConverterChain::from_settings(&settings.conversion);
        Self {
            pipeline: ConversionPipeline::new(chain),
            merger: Box::new(LopdfMerger::new()),
            settings,
        }
    }

    /// Replace the conversion pipeline (for tests).
    pub fn with_pipeline(mut self, pipeline: ConversionPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Replace the merger (for tests).
    pub fn with_merger(mut self, merger: Box<dyn PdfMerger>) -> Self {
        self.merger = merger;
        self
    }

    /// Spawn the run on a background thread.
    ///
    /// Exactly one terminal event (`Done` or `Error`) is sent per run, and
    /// it is always the last event on the channel.
    pub fn spawn(self, files: Vec<FileEntry>, output_path: PathBuf) -> io::Result<RunHandle> {
        let (tx, rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("dpm-run".to_string())
            .spawn(move || {
                match self.execute(&files, &output_path, &tx) {
                    Ok(()) => {
                        let _ = tx.send(ProgressEvent::Done { output_path });
                    }
                    Err(e) => {
                        tracing::error!("Run failed: {}", e);
                        let _ = tx.send(ProgressEvent::Error {
                            message: e.to_string(),
                        });
                    }
                }
            })?;

        Ok(RunHandle { events: rx, thread })
    }

    /// Convert all files, then merge the survivors.
    fn execute(
        &self,
        files: &[FileEntry],
        output_path: &Path,
        tx: &Sender<ProgressEvent>,
    ) -> Result<(), RunError> {
        let logger = self.open_logger(output_path);

        if let Some(ref l) = logger {
            l.info(&format!(
                "Starting run: {} file(s) -> {}",
                files.len(),
                output_path.display()
            ));
        }

        let progress_tx = tx.clone();
        let progress_logger = logger.clone();
        let progress_cb: ProgressCallback = Box::new(move |current, total, message| {
            if let Some(ref l) = progress_logger {
                l.info(message);
                l.progress(((current * 100) / total.max(1)) as u32);
            }
            let _ = progress_tx.send(ProgressEvent::Progress {
                current,
                total,
                message: message.to_string(),
            });
        });

        let status_tx = tx.clone();
        let status_cb: StatusCallback = Box::new(move |file_id, status| {
            let _ = status_tx.send(ProgressEvent::RowStatus { file_id, status });
        });

        let pdfs = self.pipeline.convert_all(files, &progress_cb, &status_cb);

        if pdfs.is_empty() {
            if let Some(ref l) = logger {
                l.error("No files to merge.");
            }
            return Err(RunError::NothingToMerge);
        }

        let stage = format!("Merging {} PDF(s)...", pdfs.len());
        if let Some(ref l) = logger {
            l.section(&stage);
        }
        let _ = tx.send(ProgressEvent::Stage {
            message: stage,
        });

        self.merger.merge(&pdfs, output_path)?;

        if let Some(ref l) = logger {
            l.success(&format!("Merged to: {}", output_path.display()));
        }
        Ok(())
    }

    /// Open the per-run log file; a logging failure never blocks the run.
    fn open_logger(&self, output_path: &Path) -> Option<Arc<RunLogger>> {
        let run_name = output_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "merge".to_string());

        let config = LogConfig {
            compact: self.settings.logging.compact,
            progress_step: self.settings.logging.progress_step,
            error_tail: self.settings.logging.error_tail as usize,
            show_timestamps: self.settings.logging.show_timestamps,
            ..LogConfig::default()
        };

        match RunLogger::new(&run_name, self.settings.logs_folder(), config, None) {
            Ok(l) => Some(Arc::new(l)),
            Err(e) => {
                tracing::warn!("Failed to create run log: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ConvertError, ConvertResult, ConverterBackend};
    use crate::merge::MergeResult;
    use crate::models::FileStatus;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct StubBackend {
        fail: bool,
    }

    impl ConverterBackend for StubBackend {
        fn name(&self) -> &str {
            "stub"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn convert(&self, _source: &Path, _dest: &Path) -> ConvertResult<()> {
            if self.fail {
                Err(ConvertError::command_failed("stub", 1, "boom"))
            } else {
                Ok(())
            }
        }
    }

    struct StubMerger {
        fail: bool,
        inputs_seen: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl PdfMerger for StubMerger {
        fn merge(&self, inputs: &[PathBuf], _output: &Path) -> MergeResult<()> {
            *self.inputs_seen.lock().unwrap() = inputs.to_vec();
            if self.fail {
                Err(MergeError::NoInputs)
            } else {
                Ok(())
            }
        }
    }

    fn test_worker(
        convert_fails: bool,
        merge_fails: bool,
    ) -> (Worker, Arc<Mutex<Vec<PathBuf>>>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.logs_folder = dir.path().join("logs").to_string_lossy().to_string();

        let inputs_seen = Arc::new(Mutex::new(Vec::new()));
        let worker = Worker::new(settings)
            .with_pipeline(ConversionPipeline::new(ConverterChain::new(vec![
                Box::new(StubBackend { fail: convert_fails }),
            ])))
            .with_merger(Box::new(StubMerger {
                fail: merge_fails,
                inputs_seen: Arc::clone(&inputs_seen),
            }));
        (worker, inputs_seen, dir)
    }

    fn entries(names: &[&str]) -> Vec<FileEntry> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| FileEntry::new(i, PathBuf::from(format!("/docs/{}", n))))
            .collect()
    }

    fn run_and_collect(
        worker: Worker,
        files: Vec<FileEntry>,
        output: PathBuf,
    ) -> Vec<ProgressEvent> {
        let handle = worker.spawn(files, output).unwrap();
        handle.thread.join().unwrap();
        handle.events.try_iter().collect()
    }

    #[test]
    fn successful_run_ends_with_exactly_one_done() {
        let (worker, inputs_seen, _logs) = test_worker(false, false);
        let files = entries(&["a.pdf", "b.docx"]);
        let output = PathBuf::from("/out/merged.pdf");

        let events = run_and_collect(worker, files, output.clone());

        let terminals: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
        assert_eq!(terminals.len(), 1);
        assert_eq!(
            events.last().unwrap(),
            &ProgressEvent::Done {
                output_path: output
            }
        );

        // The merger saw the pipeline's output, in order.
        assert_eq!(
            *inputs_seen.lock().unwrap(),
            vec![PathBuf::from("/docs/a.pdf"), PathBuf::from("/docs/b.pdf")]
        );

        // A stage event precedes the terminal event.
        let stage_pos = events
            .iter()
            .position(|e| matches!(e, ProgressEvent::Stage { .. }))
            .unwrap();
        assert_eq!(stage_pos, events.len() - 2);
    }

    #[test]
    fn all_conversions_failing_yields_single_error() {
        let (worker, inputs_seen, _logs) = test_worker(true, false);
        let files = entries(&["a.docx", "b.pptx"]);

        let events = run_and_collect(worker, files, PathBuf::from("/out/merged.pdf"));

        let terminals: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
        assert_eq!(terminals.len(), 1);
        assert!(matches!(
            events.last().unwrap(),
            ProgressEvent::Error { .. }
        ));
        assert!(!events
            .iter()
            .any(|e| matches!(e, ProgressEvent::Done { .. })));
        assert!(inputs_seen.lock().unwrap().is_empty());
    }

    #[test]
    fn merge_failure_yields_error_after_stage() {
        let (worker, _, _logs) = test_worker(false, true);
        let files = entries(&["a.pdf"]);

        let events = run_and_collect(worker, files, PathBuf::from("/out/merged.pdf"));

        assert!(matches!(
            events.last().unwrap(),
            ProgressEvent::Error { .. }
        ));
        assert!(events
            .iter()
            .any(|e| matches!(e, ProgressEvent::Stage { .. })));
    }

    #[test]
    fn per_file_failure_still_completes_the_run() {
        // One converting backend that fails only for one file name.
        struct SelectiveBackend;
        impl ConverterBackend for SelectiveBackend {
            fn name(&self) -> &str {
                "selective"
            }
            fn is_available(&self) -> bool {
                true
            }
            fn convert(&self, source: &Path, _dest: &Path) -> ConvertResult<()> {
                if source.file_name().unwrap() == "bad.docx" {
                    Err(ConvertError::command_failed("selective", 1, "boom"))
                } else {
                    Ok(())
                }
            }
        }

        let (worker, inputs_seen, _logs) = test_worker(false, false);
        let worker = worker.with_pipeline(ConversionPipeline::new(ConverterChain::new(vec![
            Box::new(SelectiveBackend),
        ])));
        let files = entries(&["bad.docx", "good.pptx"]);

        let events = run_and_collect(worker, files, PathBuf::from("/out/merged.pdf"));

        assert!(matches!(events.last().unwrap(), ProgressEvent::Done { .. }));
        assert_eq!(
            *inputs_seen.lock().unwrap(),
            vec![PathBuf::from("/docs/good.pdf")]
        );
        assert!(events.contains(&ProgressEvent::RowStatus {
            file_id: 0,
            status: FileStatus::Failed
        }));
    }

    #[test]
    fn events_preserve_fifo_order() {
        let (worker, _, _logs) = test_worker(false, false);
        let files = entries(&["a.pdf", "b.pdf"]);

        let events = run_and_collect(worker, files, PathBuf::from("/out/merged.pdf"));

        // Row statuses arrive in scan order, each before its progress event.
        let row_ids: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::RowStatus { file_id, .. } => Some(*file_id),
                _ => None,
            })
            .collect();
        assert_eq!(row_ids, vec![0, 1]);

        let progress: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Progress { current, .. } => Some(*current),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![1, 2]);
    }
}
