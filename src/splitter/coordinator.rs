//! Split run coordination
//!
//! Discovers input files and fans them out to a bounded pool of worker
//! threads over a crossbeam channel. The channel is pre-loaded with every
//! discovered path and the senders dropped, so workers drain it and exit;
//! at most `worker_count` files are in flight at any moment. A shared
//! shutdown flag (wired to Ctrl-C by the binary) stops workers between
//! files.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::SplitConfig;
use crate::error::{Result, WorkerError};
use crate::scanner::TagScanner;
use crate::splitter::worker::Worker;

/// Shared atomic counters updated by workers as files complete.
#[derive(Debug, Default)]
pub struct RunStats {
    files_processed: AtomicU64,
    files_emitted: AtomicU64,
    bytes_written: AtomicU64,
    errors: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_split(&self, files: u64, bytes: u64) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        self.files_emitted.fetch_add(files, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn files_processed(&self) -> u64 {
        self.files_processed.load(Ordering::Relaxed)
    }

    pub fn files_emitted(&self) -> u64 {
        self.files_emitted.load(Ordering::Relaxed)
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

/// Final result of a split run.
#[derive(Debug, Clone)]
pub struct SplitResult {
    /// Input files found by discovery
    pub files_discovered: usize,
    /// Input files fully processed
    pub files_processed: u64,
    /// Output files emitted (directory markers plus leaves)
    pub files_emitted: u64,
    /// Bytes written to output files
    pub bytes_written: u64,
    /// Input files that failed
    pub errors: u64,
    pub duration: Duration,
    /// False when the run was interrupted before all inputs were handled
    pub completed: bool,
}

/// Runs a split over every input file in the configured directory.
pub struct SplitCoordinator {
    config: Arc<SplitConfig>,
    shutdown: Arc<AtomicBool>,
}

impl SplitCoordinator {
    pub fn new(config: SplitConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag observed by workers between files; set it to stop the run.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn run(&self) -> Result<SplitResult> {
        let started = Instant::now();
        let inputs = discover_inputs(&self.config)?;
        let discovered = inputs.len();

        if inputs.is_empty() {
            warn!(
                input = %self.config.input_dir.display(),
                gzip = self.config.gzip,
                "no input files found"
            );
            return Ok(SplitResult {
                files_discovered: 0,
                files_processed: 0,
                files_emitted: 0,
                bytes_written: 0,
                errors: 0,
                duration: started.elapsed(),
                completed: true,
            });
        }

        let worker_count = self.config.worker_count.min(discovered);
        info!(
            files = discovered,
            workers = worker_count,
            depth = self.config.split_depth,
            "starting split run"
        );

        let scanner = Arc::new(TagScanner::new());
        let stats = Arc::new(RunStats::new());
        let (work_tx, work_rx) = bounded(discovered);
        for path in inputs {
            work_tx
                .send(path)
                .map_err(|_| WorkerError::QueueSendFailed)?;
        }
        drop(work_tx);

        let mut workers = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            workers.push(Worker::spawn(
                id,
                Arc::clone(&self.config),
                Arc::clone(&scanner),
                work_rx.clone(),
                Arc::clone(&stats),
                Arc::clone(&self.shutdown),
            )?);
        }
        drop(work_rx);

        for worker in workers {
            if let Err(join_error) = worker.join() {
                stats.record_failure();
                error!(error = %join_error, "worker terminated abnormally");
            }
        }

        let processed = stats.files_processed();
        let errors = stats.errors();
        let completed = processed + errors == discovered as u64;
        let result = SplitResult {
            files_discovered: discovered,
            files_processed: processed,
            files_emitted: stats.files_emitted(),
            bytes_written: stats.bytes_written(),
            errors,
            duration: started.elapsed(),
            completed,
        };
        debug!(
            processed = result.files_processed,
            emitted = result.files_emitted,
            errors = result.errors,
            completed = result.completed,
            "split run finished"
        );
        Ok(result)
    }
}

/// Non-recursive listing of the input directory, filtered by suffix and
/// sorted for a deterministic processing order.
fn discover_inputs(config: &SplitConfig) -> Result<Vec<PathBuf>> {
    let suffix = if config.gzip { ".xml.gz" } else { ".xml" };
    let mut inputs = Vec::new();
    for entry in WalkDir::new(&config.input_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(suffix) {
            inputs.push(entry.into_path());
        }
    }
    inputs.sort();
    Ok(inputs)
}
