//! xmlsplit - Streaming XML Splitter
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use xmlsplit::config::{CliArgs, SplitConfig};
use xmlsplit::progress::{print_header, print_summary, ProgressReporter};
use xmlsplit::splitter::SplitCoordinator;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = SplitConfig::from_args(args).context("Invalid configuration")?;

    // Print header
    if config.show_progress {
        print_header(&config);
    }

    // Create coordinator
    let coordinator = SplitCoordinator::new(config.clone());

    // Setup signal handler for graceful shutdown
    let shutdown_flag = coordinator.shutdown_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    // Create progress reporter
    let progress = if config.show_progress {
        Some(ProgressReporter::new())
    } else {
        None
    };

    if let Some(ref p) = progress {
        p.set_status("Splitting input files...");
    }

    // Run the split
    let result = coordinator.run().context("Split failed")?;

    // Finish progress
    if let Some(ref p) = progress {
        if result.completed {
            p.finish("Split completed");
        } else {
            p.finish("Split interrupted");
        }
    }

    // Print summary
    print_summary(&result, &config.output_dir.display().to_string());

    if !result.completed {
        info!("Split was interrupted before completion");
    }

    // Inputs are independent; per-file failures surface here as a
    // non-zero exit after everything else has been processed.
    if result.errors > 0 {
        anyhow::bail!("{} input file(s) failed to split", result.errors);
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("xmlsplit=debug,warn")
    } else {
        EnvFilter::new("xmlsplit=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
