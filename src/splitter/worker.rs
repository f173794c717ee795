//! Per-file worker
//!
//! One worker thread pulls input paths off the shared channel and runs the
//! sequential split loop for each: read lines, reassemble multi-line
//! opening tags, apply skip/strip patterns, walk each line's tag structure
//! through the state machine, and flush the action queue as it fills.
//!
//! Workers share nothing mutable beyond the run counters; every file gets
//! its own state, naming registry, and queue.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use flate2::read::MultiGzDecoder;
use tracing::{debug, error, info, warn};

use crate::config::SplitConfig;
use crate::error::{FileOutcome, WorkerError, WorkerResult};
use crate::queue::{ActionQueue, ActionWriter, FsWriter};
use crate::scanner::TagScanner;
use crate::splitter::coordinator::RunStats;
use crate::splitter::state::SplitState;

/// What one input file produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileReport {
    pub files_emitted: u64,
    pub bytes_written: u64,
}

/// Splits a single input file, writing results under the configured
/// output directory. This is the per-file entry point; the coordinator
/// calls it through the worker pool, but it works standalone too.
pub fn split_file(
    path: &Path,
    config: &SplitConfig,
    scanner: &TagScanner,
) -> WorkerResult<FileReport> {
    let reader = open_reader(path, config.gzip)?;
    let base = config.output_dir.join(file_stem_for(path, config.gzip));
    let mut writer = FsWriter::new();
    let files_emitted = process_stream(reader, path, &base, config, scanner, &mut writer)?;
    Ok(FileReport {
        files_emitted,
        bytes_written: writer.bytes_written(),
    })
}

/// Runs the split loop over an already-opened reader, materializing
/// through `writer`. Returns the number of files emitted.
pub fn process_stream(
    reader: impl BufRead,
    input: &Path,
    base: &Path,
    config: &SplitConfig,
    scanner: &TagScanner,
    writer: &mut dyn ActionWriter,
) -> WorkerResult<u64> {
    let mut state = SplitState::new(base, config.split_depth);
    let mut queue = ActionQueue::new();
    let mut continuation: Option<String> = None;

    for line in reader.lines() {
        let mut line = line.map_err(|source| WorkerError::ReadFailed {
            path: input.to_path_buf(),
            source,
        })?;

        if line.is_empty() {
            continue;
        }
        if config.skip.is_match(&line) {
            continue;
        }
        if scanner.is_opening_continuation(&line) {
            // A fresh unterminated tag always restarts the buffer.
            continuation = Some(line);
            continue;
        }
        if scanner.is_opening_terminator(&line) {
            if let Some(buffered) = continuation.take() {
                line = buffered + &line;
            }
        } else if let Some(buffered) = continuation.as_mut() {
            buffered.push(' ');
            buffered.push_str(&line);
            continue;
        }
        if let Some(strip) = &config.strip {
            line = strip.replace_all(&line, "").into_owned();
        }

        process_line(&line, scanner, &mut state, &mut queue)?;

        if queue.len() > config.flush_threshold {
            queue.flush(writer)?;
        }
    }

    queue.flush(writer)?;
    if !queue.is_empty() {
        warn!(
            pending = queue.len(),
            input = %input.display(),
            "input ended with an unterminated element; dropping pending actions"
        );
    }
    Ok(state.files_emitted())
}

/// Walks one logical line left to right: tags go through the state
/// machine, runs between tags accumulate as text.
fn process_line(
    line: &str,
    scanner: &TagScanner,
    state: &mut SplitState,
    queue: &mut ActionQueue,
) -> WorkerResult<()> {
    let structure = scanner.scan_line(line);
    let mut pos = 0;
    while pos < line.len() {
        match structure.range(pos..).next() {
            Some((&start, tag)) if start == pos => {
                state.apply_tag(tag, queue)?;
                pos = tag.end;
            }
            Some((&start, _)) => {
                state.push_text(&line[pos..start]);
                pos = start;
            }
            None => {
                state.push_text(&line[pos..]);
                pos = line.len();
                state.note_line_end();
            }
        }
    }
    Ok(())
}

fn open_reader(path: &Path, gzip: bool) -> WorkerResult<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => WorkerError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => WorkerError::ReadFailed {
            path: path.to_path_buf(),
            source,
        },
    })?;
    if gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(
            BufReader::new(file),
        ))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Output base name for an input file: `sprot.xml` and `sprot.xml.gz`
/// both map to `sprot`.
fn file_stem_for(path: &Path, gzip: bool) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    if gzip {
        if let Some(inner) = stem.strip_suffix(".xml") {
            return inner.to_string();
        }
    }
    stem
}

/// A spawned worker thread.
pub(crate) struct Worker {
    id: usize,
    handle: JoinHandle<()>,
}

impl Worker {
    pub(crate) fn spawn(
        id: usize,
        config: Arc<SplitConfig>,
        scanner: Arc<TagScanner>,
        work_rx: Receiver<PathBuf>,
        stats: Arc<RunStats>,
        shutdown: Arc<AtomicBool>,
    ) -> WorkerResult<Self> {
        let handle = thread::Builder::new()
            .name(format!("split-{id}"))
            .spawn(move || worker_loop(id, &config, &scanner, &work_rx, &stats, &shutdown))
            .map_err(|source| WorkerError::InitFailed {
                id,
                reason: source.to_string(),
            })?;
        Ok(Self { id, handle })
    }

    pub(crate) fn join(self) -> WorkerResult<()> {
        self.handle
            .join()
            .map_err(|_| WorkerError::Panicked { id: self.id })
    }
}

fn worker_loop(
    id: usize,
    config: &SplitConfig,
    scanner: &TagScanner,
    work_rx: &Receiver<PathBuf>,
    stats: &RunStats,
    shutdown: &AtomicBool,
) {
    debug!(worker = id, "worker started");
    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!(worker = id, "worker stopping on shutdown signal");
            break;
        }
        match work_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(path) => match process_file(&path, config, scanner) {
                FileOutcome::Split { path, files, bytes } => {
                    stats.record_split(files, bytes);
                    info!(
                        worker = id,
                        files,
                        input = %path.display(),
                        "files generated"
                    );
                }
                FileOutcome::Failed { path, error } => {
                    stats.record_failure();
                    error!(worker = id, input = %path.display(), %error, "failed to split file");
                }
            },
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!(worker = id, "worker finished");
}

fn process_file(path: &Path, config: &SplitConfig, scanner: &TagScanner) -> FileOutcome {
    match split_file(path, config, scanner) {
        Ok(report) => FileOutcome::Split {
            path: path.to_path_buf(),
            files: report.files_emitted,
            bytes: report.bytes_written,
        },
        Err(error) => FileOutcome::Failed {
            path: path.to_path_buf(),
            error,
        },
    }
}
