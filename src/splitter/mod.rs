//! Core splitting engine
//!
//! Architecture:
//!
//! ```text
//! Coordinator
//! ├── discovers *.xml / *.xml.gz in the input directory
//! ├── preloads paths into a bounded crossbeam channel
//! │
//! ├── Worker threads (split-0 .. split-N): one input file at a time
//! │   ├── line loop: skip / join continuations / strip
//! │   ├── TagScanner: per-line tag map (byte offset → tag)
//! │   ├── SplitState: depth tracking, directory stack, leaf buffering
//! │   └── ActionQueue: ordered mkdir/write actions, drained FIFO
//! │
//! └── RunStats: atomic counters aggregated into a SplitResult
//! ```

pub mod coordinator;
pub mod state;
pub mod worker;

pub use coordinator::{RunStats, SplitCoordinator, SplitResult};
pub use state::{SplitState, MARKER_FILE, XML_DECLARATION};
pub use worker::{process_stream, split_file, FileReport};
