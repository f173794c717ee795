//! xmlsplit - Streaming XML Splitter
//!
//! A tool for exploding large line-oriented XML files (optionally gzipped)
//! into a directory tree of small files, one tree per input. Inputs are
//! streamed line by line, so files far larger than memory split fine.
//!
//! # Features
//!
//! - **Depth-based splitting**: Elements above the configured split depth
//!   become numbered directories holding a `root.xml` marker; elements at
//!   or below it become numbered `.xml` files.
//!
//! - **Streaming**: One pass over the input, a bounded action queue, and
//!   a flush threshold keep memory flat regardless of input size.
//!
//! - **Parallel inputs**: A worker pool splits many files at once. Files
//!   are independent, so failures are isolated per input.
//!
//! - **Line surgery**: Skip patterns drop declaration/DOCTYPE lines;
//!   strip patterns delete noise (namespaces, attributes) before scanning;
//!   multi-line opening tags are joined back together.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Input Directory                          │
//! │                 (*.xml or *.xml.gz files)                    │
//! └────────────────────────────┬────────────────────────────────┘
//!                              │
//!                              │ discovery (non-recursive)
//!                              ▼
//!                 ┌──────────────────────────┐
//!                 │     Work Queue           │
//!                 │  (crossbeam bounded)     │
//!                 └──────┬──────┬──────┬─────┘
//!                        │      │      │
//!          ┌─────────────┘      │      └─────────────┐
//!          ▼                    ▼                    ▼
//!    ┌──────────┐         ┌──────────┐         ┌──────────┐
//!    │ Worker 1 │         │ Worker 2 │   ...   │ Worker N │
//!    │ scanner  │         │ scanner  │         │ scanner  │
//!    │ state    │         │ state    │         │ state    │
//!    │ queue    │         │ queue    │         │ queue    │
//!    └────┬─────┘         └────┬─────┘         └────┬─────┘
//!         │                    │                    │
//!         ▼                    ▼                    ▼
//!    ┌─────────────────────────────────────────────────────┐
//!    │           Output Trees (one per input)              │
//!    │   out/sprot/uniprot/0/root.xml                      │
//!    │   out/sprot/uniprot/0/entry.0.xml  entry.1.xml ...  │
//!    └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Split every .xml in /data/dumps, one element per file at depth 1
//! xmlsplit /data/dumps -o /data/split
//!
//! # Gzipped inputs, 8 workers, split at depth 2
//! xmlsplit /data/dumps --gzip -w 8 -d 2
//! ```

pub mod config;
pub mod error;
pub mod naming;
pub mod progress;
pub mod queue;
pub mod scanner;
pub mod splitter;

pub use config::{CliArgs, SplitConfig};
pub use error::{Result, SplitError};
pub use splitter::{SplitCoordinator, SplitResult};
