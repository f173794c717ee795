//! Line-oriented tag scanning
//!
//! The scanner finds XML-ish tags in a single logical line using a fixed
//! set of regular expressions. It is deliberately not an XML parser: there
//! is no entity handling, no CDATA awareness, and malformed markup is
//! treated as plain text rather than an error. Tags that open on one line
//! and close on a later one are handled upstream by the worker loop's
//! reassembly buffer, driven by the continuation/terminator patterns here.

use std::collections::BTreeMap;

use regex::Regex;

/// Opening tag with optional attributes, e.g. `<entry dataset="x">`
const OPENING_PATTERN: &str =
    r#"<([a-zA-Z:_][a-zA-Z0-9:_.-]*)(\s*>|\s+([a-zA-Z0-9:_.-]+\s*=\s*("[^"]*"|'[^']*')\s*)*>)"#;

/// Closing tag; the name may be empty, so `</ name>` and `</>` both match
const CLOSING_PATTERN: &str = r"</\s*([a-zA-Z:_]?[a-zA-Z0-9:_.-]*)\s*>";

/// Self-closing tag, e.g. `<accession value="Q6GZX4"/>`
const SELF_CLOSING_PATTERN: &str =
    r#"<([a-zA-Z:_][a-zA-Z0-9:_.-]*)(\s*/>|\s+([a-zA-Z0-9:_.-]+\s*=\s*("[^"]*"|'[^']*')\s*)*/>)"#;

/// Opening tag that runs off the end of the line (attributes, no `>`)
const CONTINUATION_PATTERN: &str =
    r#"<([a-zA-Z:_][a-zA-Z0-9:_.-]*)\s+([a-zA-Z0-9:_.-]+\s*=\s*("[^"]*"|'[^']*')\s*)*$"#;

/// Line that terminates a buffered opening tag: attributes then `>`
const TERMINATOR_PATTERN: &str = r#"^\s*([a-zA-Z0-9:_.-]+\s*=\s*("[^"]*"|'[^']*')\s*)*>"#;

/// What a matched tag does to the document structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<name ...>` - increases depth
    Opening,
    /// `</name>` - decreases depth
    Closing,
    /// `<name .../>` - depth-neutral
    SelfClosing,
    /// First fragment of a tag continued on later lines
    OpeningContinuation,
    /// Final fragment (`... >`) of a continued tag
    OpeningTerminator,
}

/// One tag match within a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub kind: TagKind,
    /// Element name (capture group 1); empty for malformed closers
    pub name: String,
    /// The exact matched substring, attributes included
    pub text: String,
    /// Byte offset of the match start within the line
    pub start: usize,
    /// Byte offset one past the match end
    pub end: usize,
}

/// The structure of one logical line: tags keyed by start offset
pub type LineStructure = BTreeMap<usize, Tag>;

/// Compiled tag patterns, built once and shared across workers.
#[derive(Debug)]
pub struct TagScanner {
    opening: Regex,
    closing: Regex,
    self_closing: Regex,
    continuation: Regex,
    terminator: Regex,
}

impl TagScanner {
    pub fn new() -> Self {
        Self {
            opening: Regex::new(OPENING_PATTERN).expect("Invalid opening tag pattern"),
            closing: Regex::new(CLOSING_PATTERN).expect("Invalid closing tag pattern"),
            self_closing: Regex::new(SELF_CLOSING_PATTERN)
                .expect("Invalid self-closing tag pattern"),
            continuation: Regex::new(CONTINUATION_PATTERN)
                .expect("Invalid continuation pattern"),
            terminator: Regex::new(TERMINATOR_PATTERN).expect("Invalid terminator pattern"),
        }
    }

    /// Scans one logical line and returns its tags keyed by start offset.
    ///
    /// Patterns run in a fixed order and later kinds overwrite earlier ones
    /// at the same offset, so a self-closing tag wins over the opening-tag
    /// reading of the same `<`.
    pub fn scan_line(&self, line: &str) -> LineStructure {
        let mut structure = LineStructure::new();
        let passes = [
            (TagKind::Opening, &self.opening),
            (TagKind::Closing, &self.closing),
            (TagKind::SelfClosing, &self.self_closing),
            (TagKind::OpeningContinuation, &self.continuation),
            (TagKind::OpeningTerminator, &self.terminator),
        ];
        for (kind, pattern) in passes {
            for caps in pattern.captures_iter(line) {
                let Some(full) = caps.get(0) else { continue };
                let name = caps
                    .get(1)
                    .map(|group| group.as_str().to_string())
                    .unwrap_or_default();
                structure.insert(
                    full.start(),
                    Tag {
                        kind,
                        name,
                        text: full.as_str().to_string(),
                        start: full.start(),
                        end: full.end(),
                    },
                );
            }
        }
        structure
    }

    /// True if the line starts a tag that is not closed on this line.
    pub fn is_opening_continuation(&self, line: &str) -> bool {
        self.continuation.is_match(line)
    }

    /// True if the line begins with the tail of a continued opening tag.
    pub fn is_opening_terminator(&self, line: &str) -> bool {
        self.terminator.is_match(line)
    }
}

impl Default for TagScanner {
    fn default() -> Self {
        Self::new()
    }
}
