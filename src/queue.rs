//! Deferred filesystem effects
//!
//! The split state machine never touches the filesystem directly; it queues
//! IO actions here. Actions are strictly ordered: flushing materializes
//! actions front to back and stops at the first one that is not ready, so
//! nothing is ever written ahead of an earlier pending action. The open
//! leaf file is always the queue tail while it is open, which is what makes
//! in-place line appends safe.
//!
//! Materialization goes through the [`ActionWriter`] seam so the state
//! machine and worker loop are testable with a recording writer and no
//! filesystem.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{WorkerError, WorkerResult};

/// What an action does when materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Recursive directory creation; existing directories are fine
    CreateDirectory,
    /// Create or truncate a file with the action's lines
    WriteFile,
}

/// A single deferred filesystem effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoAction {
    pub kind: ActionKind,
    pub path: PathBuf,
    /// Logical lines, one tag or text run each; unused for directories
    pub lines: Vec<String>,
    /// Not-ready actions block the flush at their queue position
    pub ready: bool,
}

impl IoAction {
    pub fn directory(path: PathBuf) -> Self {
        Self {
            kind: ActionKind::CreateDirectory,
            path,
            lines: Vec::new(),
            ready: true,
        }
    }

    pub fn file(path: PathBuf, lines: Vec<String>, ready: bool) -> Self {
        Self {
            kind: ActionKind::WriteFile,
            path,
            lines,
            ready,
        }
    }

    /// File content exactly as written to disk.
    pub fn content(&self) -> String {
        let mut content = self.lines.join("\n");
        content.push('\n');
        content
    }
}

/// Materializes actions; implemented by the filesystem writer and by
/// recording doubles in tests.
pub trait ActionWriter {
    fn create_dir(&mut self, path: &Path) -> io::Result<()>;
    fn write_file(&mut self, path: &Path, content: &str) -> io::Result<()>;
}

/// Writes actions to the local filesystem, tracking bytes written.
#[derive(Debug, Default)]
pub struct FsWriter {
    bytes_written: u64,
}

impl FsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl ActionWriter for FsWriter {
    fn create_dir(&mut self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write_file(&mut self, path: &Path, content: &str) -> io::Result<()> {
        fs::write(path, content)?;
        self.bytes_written += content.len() as u64;
        Ok(())
    }
}

/// Ordered queue of pending IO actions for one input file.
#[derive(Debug, Default)]
pub struct ActionQueue {
    actions: VecDeque<IoAction>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_directory(&mut self, path: PathBuf) {
        self.actions.push_back(IoAction::directory(path));
    }

    pub fn push_file(&mut self, path: PathBuf, lines: Vec<String>, ready: bool) {
        self.actions.push_back(IoAction::file(path, lines, ready));
    }

    /// Appends one logical line to the action at the tail of the queue.
    pub fn append_line(&mut self, line: String) {
        if let Some(action) = self.actions.back_mut() {
            action.lines.push(line);
        }
    }

    /// Marks the tail action ready for materialization.
    pub fn mark_ready(&mut self) {
        if let Some(action) = self.actions.back_mut() {
            action.ready = true;
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Pending actions in queue order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &IoAction> {
        self.actions.iter()
    }

    /// Materializes ready actions from the front of the queue, stopping at
    /// the first that is not ready. Returns how many were written. A no-op
    /// when the head is pending or the queue is empty.
    pub fn flush(&mut self, writer: &mut dyn ActionWriter) -> WorkerResult<usize> {
        let mut flushed = 0;
        while let Some(head) = self.actions.front() {
            if !head.ready {
                break;
            }
            let Some(action) = self.actions.pop_front() else {
                break;
            };
            match action.kind {
                ActionKind::CreateDirectory => {
                    writer.create_dir(&action.path).map_err(|source| {
                        WorkerError::CreateDirFailed {
                            path: action.path.clone(),
                            source,
                        }
                    })?;
                }
                ActionKind::WriteFile => {
                    let content = action.content();
                    writer.write_file(&action.path, &content).map_err(|source| {
                        WorkerError::WriteFailed {
                            path: action.path.clone(),
                            source,
                        }
                    })?;
                }
            }
            flushed += 1;
        }
        if flushed > 0 {
            debug!(flushed, pending = self.actions.len(), "flushed io actions");
        }
        Ok(flushed)
    }
}

/// Recording test double for [`ActionWriter`].
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingWriter {
    pub ops: Vec<RecordedOp>,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RecordedOp {
    Dir(PathBuf),
    File(PathBuf, String),
}

#[cfg(test)]
impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths of written files, in materialization order.
    pub fn file_paths(&self) -> Vec<&Path> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                RecordedOp::File(path, _) => Some(path.as_path()),
                RecordedOp::Dir(_) => None,
            })
            .collect()
    }

    /// Content of the written file at `path`, if any.
    pub fn content_of(&self, path: &Path) -> Option<&str> {
        self.ops.iter().find_map(|op| match op {
            RecordedOp::File(p, content) if p == path => Some(content.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
impl ActionWriter for RecordingWriter {
    fn create_dir(&mut self, path: &Path) -> io::Result<()> {
        self.ops.push(RecordedOp::Dir(path.to_path_buf()));
        Ok(())
    }

    fn write_file(&mut self, path: &Path, content: &str) -> io::Result<()> {
        self.ops
            .push(RecordedOp::File(path.to_path_buf(), content.to_string()));
        Ok(())
    }
}
