//! dirscan - Parallel Filesystem Scanner
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use dirscan::config::{CliArgs, ScanConfig};
use dirscan::progress::{print_header, print_summary, ProgressReporter};
use dirscan::scanner::ScanCoordinator;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

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
    let args = CliArgs::parse();

    setup_logging(args.verbose);

    let config = ScanConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(&config);
    }

    let coordinator = ScanCoordinator::new(config.clone());

    // Graceful shutdown on Ctrl-C: wakes every blocked worker
    let cancel = coordinator.cancel_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        cancel.request_shutdown();
    })
    .context("Failed to set signal handler")?;

    let progress = if config.show_progress {
        let p = ProgressReporter::new();
        p.set_status("Scanning...");
        Some(p)
    } else {
        None
    };

    let result = coordinator.run().context("Scan failed")?;

    if let Some(ref p) = progress {
        if result.completed {
            p.finish("Scan completed");
        } else {
            p.finish("Scan interrupted");
        }
    }

    print_summary(&result, &config.output_path.display().to_string());

    if !result.completed {
        info!("Scan was interrupted before completion");
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("dirscan=debug,warn")
    } else {
        EnvFilter::new("dirscan=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
