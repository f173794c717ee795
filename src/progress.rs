//! Progress reporting for split runs
//!
//! Provides a real-time spinner using indicatif plus styled
//! header/summary output on the console.

use crate::config::SplitConfig;
use crate::splitter::SplitResult;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a run is in flight
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let digits: Vec<char> = n.to_string().chars().rev().collect();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }

    out.chars().rev().collect()
}

/// Print a header at the start of a run
pub fn print_header(config: &SplitConfig) {
    println!();
    println!(
        "{} {}",
        style("xmlsplit").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Input:").bold(), config.input_dir.display());
    println!(
        "  {} {}",
        style("Output:").bold(),
        config.output_dir.display()
    );
    println!("  {} {}", style("Depth:").bold(), config.split_depth);
    println!("  {} {}", style("Workers:").bold(), config.worker_count);
    if config.gzip {
        println!("  {} gzip", style("Compression:").bold());
    }
    println!();
}

/// Print a summary of the split results
pub fn print_summary(result: &SplitResult, output_dir: &str) {
    let duration_secs = result.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        result.files_processed as f64 / duration_secs
    } else {
        0.0
    };

    println!();
    if result.completed {
        println!("{}", style("Split Complete").green().bold());
    } else {
        println!("{}", style("Split Interrupted").yellow().bold());
    }
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {} of {}",
        style("Inputs:").bold(),
        format_number(result.files_processed),
        format_number(result.files_discovered as u64)
    );
    println!(
        "  {} {}",
        style("Files Written:").bold(),
        format_number(result.files_emitted)
    );
    println!(
        "  {} {}",
        style("Output Size:").bold(),
        format_size(result.bytes_written, BINARY)
    );
    println!(
        "  {} {:.1}s ({:.1} inputs/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    if result.errors > 0 {
        println!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(result.errors)
        );
    }
    println!("  {} {}", style("Output Dir:").bold(), output_dir);
    println!();
}
