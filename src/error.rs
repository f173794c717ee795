//! Error types for xmlsplit
//!
//! This module defines the error hierarchy covering:
//! - Configuration and CLI errors
//! - Per-file splitting errors (read, write, state)
//! - Worker thread errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors carry the path they relate to so log lines are actionable
//! - Preserve error chains for debugging

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level error type for the xmlsplit application
#[derive(Error, Debug)]
pub enum SplitError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Per-file worker errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors outside of per-file processing (discovery, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid split depth
    #[error("Invalid split depth {depth}: must be at least 1")]
    InvalidSplitDepth { depth: u32 },

    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid flush threshold
    #[error("Invalid flush threshold {value}: must be at least 1")]
    InvalidFlushThreshold { value: usize },

    /// Skip pattern failed to compile
    #[error("Invalid skip pattern '{pattern}': {reason}")]
    InvalidSkipPattern { pattern: String, reason: String },

    /// Strip pattern failed to compile
    #[error("Invalid strip pattern '{pattern}': {reason}")]
    InvalidStripPattern { pattern: String, reason: String },

    /// Input directory missing
    #[error("Input directory '{path}' does not exist or is not a directory")]
    InputDirNotFound { path: PathBuf },
}

/// Errors raised while splitting a single input file
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Input file disappeared between discovery and open
    #[error("Input file not found: '{path}'")]
    InputNotFound { path: PathBuf },

    /// Read failure (includes gzip decode errors)
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File write failed
    #[error("Failed to write '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Directory stack underflow: a closing tag tried to leave the output base
    #[error("Directory stack underflow: closing tag below the output root")]
    StackUnderflow,

    /// Worker thread failed to start
    #[error("Failed to start worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },

    /// Work queue send failed
    #[error("Failed to enqueue work item: queue full or closed")]
    QueueSendFailed,

    /// Worker panicked
    #[error("Worker {id} panicked")]
    Panicked { id: usize },
}

impl WorkerError {
    /// The input or output path this error relates to, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            WorkerError::InputNotFound { path }
            | WorkerError::ReadFailed { path, .. }
            | WorkerError::CreateDirFailed { path, .. }
            | WorkerError::WriteFailed { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for SplitError
pub type Result<T> = std::result::Result<T, SplitError>;

/// Result type alias for WorkerError
pub type WorkerResult<T> = std::result::Result<T, WorkerError>;

/// Outcome of splitting one input file
#[derive(Debug)]
pub enum FileOutcome {
    /// File fully processed
    Split {
        path: PathBuf,
        files: u64,
        bytes: u64,
    },

    /// Failed with error; partial output may exist on disk
    Failed { path: PathBuf, error: WorkerError },
}

impl FileOutcome {
    /// Returns true if this outcome represents success
    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Split { .. })
    }

    /// Returns the input path associated with this outcome
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Split { path, .. } => path,
            FileOutcome::Failed { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let worker_err = WorkerError::StackUnderflow;
        let split_err: SplitError = worker_err.into();
        assert!(matches!(split_err, SplitError::Worker(_)));

        let config_err = ConfigError::InvalidSplitDepth { depth: 0 };
        let split_err: SplitError = config_err.into();
        assert!(matches!(split_err, SplitError::Config(_)));
    }

    #[test]
    fn test_worker_error_path() {
        let err = WorkerError::InputNotFound {
            path: PathBuf::from("/data/sprot.xml"),
        };
        assert_eq!(err.path(), Some(Path::new("/data/sprot.xml")));
        assert_eq!(WorkerError::StackUnderflow.path(), None);
    }

    #[test]
    fn test_outcome_helpers() {
        let ok = FileOutcome::Split {
            path: PathBuf::from("a.xml"),
            files: 3,
            bytes: 120,
        };
        assert!(ok.is_success());
        assert_eq!(ok.path(), Path::new("a.xml"));

        let failed = FileOutcome::Failed {
            path: PathBuf::from("b.xml"),
            error: WorkerError::StackUnderflow,
        };
        assert!(!failed.is_success());
    }
}
