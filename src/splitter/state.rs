//! Split state machine
//!
//! Folds one tag at a time into per-file state and emits IO actions.
//! Elements opened above the split depth become directories with a
//! `root.xml` marker; elements at or below it become leaf files. Text
//! between tags is accumulated while a leaf is open and flushed, trimmed,
//! as a single line when the next tag arrives.
//!
//! Depth is signed on purpose: stray closing tags in malformed input push
//! it below zero, and later transitions follow the arithmetic rather than
//! a clamp.

use std::path::Path;

use crate::error::WorkerResult;
use crate::naming::NamingRegistry;
use crate::queue::ActionQueue;
use crate::scanner::{Tag, TagKind};

/// Declaration line prepended to every emitted file.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Marker file written inside each boundary directory.
pub const MARKER_FILE: &str = "root.xml";

/// Per-input-file split state.
#[derive(Debug)]
pub struct SplitState {
    split_depth: i32,
    depth: i32,
    naming: NamingRegistry,
    inner_text: String,
    file_open: bool,
    files_emitted: u64,
}

impl SplitState {
    pub fn new(base: &Path, split_depth: u32) -> Self {
        Self {
            split_depth: split_depth as i32,
            depth: 0,
            naming: NamingRegistry::new(base),
            inner_text: String::new(),
            file_open: false,
            files_emitted: 0,
        }
    }

    /// Count of directory markers and leaf files emitted so far.
    pub fn files_emitted(&self) -> u64 {
        self.files_emitted
    }

    /// Folds one tag into the state, emitting actions onto `queue`.
    pub fn apply_tag(&mut self, tag: &Tag, queue: &mut ActionQueue) -> WorkerResult<()> {
        self.flush_inner_text(queue);

        match tag.kind {
            TagKind::Opening => {
                if self.depth < self.split_depth {
                    self.emit_directory(&tag.name, self_closing_marker(&tag.text), queue);
                } else if !self.file_open {
                    let path = self.naming.next_file_path(&tag.name);
                    queue.push_file(
                        path,
                        vec![XML_DECLARATION.to_string(), tag.text.clone()],
                        false,
                    );
                    self.file_open = true;
                    self.files_emitted += 1;
                } else {
                    queue.append_line(tag.text.clone());
                }
                self.depth += 1;
            }

            TagKind::Closing => {
                if self.depth > self.split_depth + 1 {
                    queue.append_line(tag.text.clone());
                } else if self.depth == self.split_depth + 1 {
                    queue.append_line(tag.text.clone());
                    queue.mark_ready();
                    self.file_open = false;
                } else if self.depth <= self.split_depth
                    && self.naming.boundary_name() == Some(tag.name.as_str())
                {
                    self.naming.exit_directory()?;
                }
                self.depth -= 1;
            }

            TagKind::SelfClosing => {
                if self.depth < self.split_depth {
                    self.emit_directory(&tag.name, tag.text.clone(), queue);
                    self.naming.exit_directory()?;
                } else if !self.file_open {
                    let path = self.naming.next_file_path(&tag.name);
                    queue.push_file(
                        path,
                        vec![XML_DECLARATION.to_string(), tag.text.clone()],
                        true,
                    );
                    self.files_emitted += 1;
                } else {
                    queue.append_line(tag.text.clone());
                }
            }

            TagKind::OpeningContinuation | TagKind::OpeningTerminator => {}
        }
        Ok(())
    }

    /// Accumulates text between tags; only meaningful while a leaf is open.
    pub fn push_text(&mut self, text: &str) {
        if self.file_open {
            self.inner_text.push_str(text);
        }
    }

    /// Notes that the line ended inside text rather than at a tag boundary.
    pub fn note_line_end(&mut self) {
        if self.file_open {
            self.inner_text.push('\n');
        }
    }

    fn emit_directory(&mut self, name: &str, marker_line: String, queue: &mut ActionQueue) {
        let dir = self.naming.enter_directory(name);
        let marker_path = dir.join(MARKER_FILE);
        queue.push_directory(dir);
        queue.push_file(
            marker_path,
            vec![XML_DECLARATION.to_string(), marker_line],
            true,
        );
        self.files_emitted += 1;
    }

    fn flush_inner_text(&mut self, queue: &mut ActionQueue) {
        if self.inner_text.is_empty() {
            return;
        }
        if self.file_open {
            let trimmed = self.inner_text.trim();
            if !trimmed.is_empty() {
                queue.append_line(trimmed.to_string());
            }
        }
        self.inner_text.clear();
    }

    #[cfg(test)]
    pub(crate) fn naming(&self) -> &NamingRegistry {
        &self.naming
    }
}

/// Rewrites an opening tag's text as a self-closing tag.
fn self_closing_marker(text: &str) -> String {
    match text.strip_suffix('>') {
        Some(head) => format!("{head}/>"),
        None => text.to_string(),
    }
}
