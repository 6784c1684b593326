//! Progress and summary display
//!
//! A spinner shows elapsed time while the scan runs; the banner and summary
//! are printed around it.

use crate::config::ScanConfig;
use crate::scanner::ScanResult;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while the scan runs
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
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a banner at the start of the scan
pub fn print_header(config: &ScanConfig) {
    println!();
    println!(
        "{} {}",
        style("dirscan").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Root:").bold(), config.root.display());
    println!("  {} {}", style("Workers:").bold(), config.worker_count);
    println!("  {} {}", style("Format:").bold(), config.format.as_str());
    println!(
        "  {} {}",
        style("Output:").bold(),
        config.output_path.display()
    );

    let f = &config.classifier;
    if !f.extensions.is_empty() {
        println!(
            "  {} {}",
            style("Extensions:").bold(),
            f.extensions.join(", ")
        );
    }
    if f.min_size.is_some() || f.max_size.is_some() {
        println!(
            "  {} {} - {} bytes",
            style("Size:").bold(),
            f.min_size.map_or_else(|| "0".into(), |n| format_number(n)),
            f.max_size.map_or_else(|| "unbounded".into(), |n| format_number(n)),
        );
    }
    if let Some(owner) = &f.owner {
        println!("  {} {}", style("Owner:").bold(), owner);
    }
    if let Some(group) = &f.group {
        println!("  {} {}", style("Group:").bold(), group);
    }
    if let Some(bits) = f.permissions {
        println!("  {} {:o}", style("Permissions:").bold(), bits);
    }
    println!();
}

/// Print a summary of the scan results
pub fn print_summary(result: &ScanResult, output: &str) {
    let duration_secs = result.duration.as_secs_f64();
    let entries = result.total_files + result.total_dirs;
    let rate = if duration_secs > 0.0 {
        entries as f64 / duration_secs
    } else {
        0.0
    };

    println!();
    if result.completed {
        println!("{}", style("Scan Complete").green().bold());
    } else {
        println!("{}", style("Scan Interrupted").yellow().bold());
    }
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Files:").bold(),
        format_number(result.total_files)
    );
    println!(
        "  {} {}",
        style("Directories:").bold(),
        format_number(result.total_dirs)
    );
    println!(
        "  {} {:.1}s ({:.0} entries/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    println!("  {} {}", style("Output:").bold(), output);
    println!();
}
