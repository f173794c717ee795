//! Configuration types for xmlsplit
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation and compiled patterns

use crate::error::ConfigError;
use clap::Parser;
use regex::Regex;
use std::path::PathBuf;

/// Maximum reasonable worker count
pub const MAX_WORKERS: usize = 512;

/// Default number of queued output actions before a drain is attempted
pub const DEFAULT_FLUSH_THRESHOLD: usize = 10;

/// Lines matching this pattern are dropped before tag scanning.
/// XML declarations and DOCTYPEs never contribute to the output tree.
pub const DEFAULT_SKIP_PATTERN: &str = r"(<\?xml)|(<!DOCTYPE)";

/// Streaming XML splitter: explode large XML files into a directory tree
#[derive(Parser, Debug, Clone)]
#[command(
    name = "xmlsplit",
    version,
    about = "Split large XML files into a directory tree of small files",
    long_about = "Scans a directory for XML files and splits each one into a \
                  directory hierarchy.\n\n\
                  Elements above the split depth become numbered directories \
                  (with a root.xml marker holding the element's own tag); \
                  elements at or below it become numbered .xml files.\n\n\
                  Files are streamed line by line, so inputs much larger than \
                  memory are fine.",
    after_help = "EXAMPLES:\n    \
        xmlsplit /data/dumps -o /data/split\n    \
        xmlsplit /data/dumps --gzip -w 8\n    \
        xmlsplit /data/dumps -d 2 --strip ' xmlns(:[a-z]+)?=\"[^\"]*\"'\n    \
        xmlsplit /data/dumps --skip '(<\\?xml)|(<!DOCTYPE)|(<!--)'"
)]
pub struct CliArgs {
    /// Directory containing the XML files to split
    #[arg(value_name = "INPUT_DIR")]
    pub input: PathBuf,

    /// Output directory for the split trees
    #[arg(short, long, default_value = "output", value_name = "DIR")]
    pub output: PathBuf,

    /// Element depth at which whole elements become files instead of directories
    #[arg(short = 'd', long = "depth", default_value_t = 1, value_name = "NUM")]
    pub depth: u32,

    /// Treat inputs as gzip-compressed (.xml.gz)
    #[arg(long)]
    pub gzip: bool,

    /// Number of worker threads (one input file per worker at a time)
    #[arg(
        short = 'w',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Drop input lines matching this pattern before scanning
    #[arg(long, default_value = DEFAULT_SKIP_PATTERN, value_name = "PATTERN")]
    pub skip: String,

    /// Delete matches of this pattern from each line before scanning
    #[arg(long, default_value = "", value_name = "PATTERN")]
    pub strip: String,

    /// Queued output actions before a drain is attempted
    #[arg(long, default_value_t = DEFAULT_FLUSH_THRESHOLD, value_name = "NUM")]
    pub flush_threshold: usize,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (per-file detail)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn default_workers() -> usize {
    // Splitting is CPU bound (regex scanning), so one worker per core
    num_cpus::get().clamp(1, MAX_WORKERS)
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Directory scanned for input files
    pub input_dir: PathBuf,

    /// Root of the output trees (one subtree per input file)
    pub output_dir: PathBuf,

    /// Depth at which elements become files; shallower elements become directories
    pub split_depth: u32,

    /// Inputs are gzip-compressed
    pub gzip: bool,

    /// Number of worker threads
    pub worker_count: usize,

    /// Compiled skip pattern
    pub skip: Regex,

    /// Compiled strip pattern (None if not configured)
    pub strip: Option<Regex>,

    /// Queued output actions before a drain is attempted
    pub flush_threshold: usize,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl SplitConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.depth < 1 {
            return Err(ConfigError::InvalidSplitDepth { depth: args.depth });
        }

        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        if args.flush_threshold < 1 {
            return Err(ConfigError::InvalidFlushThreshold {
                value: args.flush_threshold,
            });
        }

        if !args.input.is_dir() {
            return Err(ConfigError::InputDirNotFound { path: args.input });
        }

        let skip = Regex::new(&args.skip).map_err(|e| ConfigError::InvalidSkipPattern {
            pattern: args.skip.clone(),
            reason: e.to_string(),
        })?;

        // An empty strip pattern means "strip nothing", not "strip everywhere"
        let strip = if args.strip.is_empty() {
            None
        } else {
            Some(
                Regex::new(&args.strip).map_err(|e| ConfigError::InvalidStripPattern {
                    pattern: args.strip.clone(),
                    reason: e.to_string(),
                })?,
            )
        };

        Ok(Self {
            input_dir: args.input,
            output_dir: args.output,
            split_depth: args.depth,
            gzip: args.gzip,
            worker_count: args.workers,
            skip,
            strip,
            flush_threshold: args.flush_threshold,
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }
}
