//! Output naming
//!
//! Allocates collision-free directory and file paths for one input file.
//! Every path is derived from a '/'-joined key running from the output
//! base through the currently entered directories to the candidate name;
//! a counter per key hands out suffixes, so repeated sibling elements get
//! `name/0`, `name/1`, ... directories and `name.0.xml`, `name.1.xml`, ...
//! leaf files. Directory and file counters are independent maps.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{WorkerError, WorkerResult};

/// One entered directory boundary: element name plus its collision index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirFrame {
    pub name: String,
    pub index: u32,
}

/// Per-input-file path allocator.
#[derive(Debug)]
pub struct NamingRegistry {
    base: String,
    frames: Vec<DirFrame>,
    directory_counters: HashMap<String, u32>,
    file_counters: HashMap<String, u32>,
}

impl NamingRegistry {
    /// `base` is `outputDir/<input file stem>`; it is never popped.
    pub fn new(base: &Path) -> Self {
        Self {
            base: base.to_string_lossy().into_owned(),
            frames: Vec::new(),
            directory_counters: HashMap::new(),
            file_counters: HashMap::new(),
        }
    }

    /// Enters a directory boundary for `name` and returns its path,
    /// `<key>/<index>`.
    pub fn enter_directory(&mut self, name: &str) -> PathBuf {
        let key = self.path_key(name);
        let index = Self::next_index(&mut self.directory_counters, &key);
        self.frames.push(DirFrame {
            name: name.to_string(),
            index,
        });
        PathBuf::from(format!("{key}/{index}"))
    }

    /// Leaves the innermost directory boundary, returning its frame.
    pub fn exit_directory(&mut self) -> WorkerResult<DirFrame> {
        self.frames.pop().ok_or(WorkerError::StackUnderflow)
    }

    /// Allocates the next leaf file path for `name`, `<key>.<index>.xml`.
    /// Leaves the directory stack untouched.
    pub fn next_file_path(&mut self, name: &str) -> PathBuf {
        let key = self.path_key(name);
        let index = Self::next_index(&mut self.file_counters, &key);
        PathBuf::from(format!("{key}.{index}.xml"))
    }

    /// Name of the innermost entered directory, if any.
    pub fn boundary_name(&self) -> Option<&str> {
        self.frames.last().map(|frame| frame.name.as_str())
    }

    /// Number of entered directories.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    // Seen keys advance their counter and use the new value; a fresh key
    // starts at 0.
    fn next_index(counters: &mut HashMap<String, u32>, key: &str) -> u32 {
        match counters.get_mut(key) {
            Some(counter) => {
                *counter += 1;
                *counter
            }
            None => {
                counters.insert(key.to_string(), 0);
                0
            }
        }
    }

    fn path_key(&self, name: &str) -> String {
        let mut key = String::with_capacity(self.base.len() + name.len() + 16);
        key.push_str(&self.base);
        for frame in &self.frames {
            key.push('/');
            key.push_str(&frame.name);
            key.push('/');
            key.push_str(&frame.index.to_string());
        }
        key.push('/');
        key.push_str(name);
        key
    }
}
