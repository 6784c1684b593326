//! Configuration types for dirscan
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - The output format selection

use crate::error::ConfigError;
use crate::filter::FileClassifier;
use chrono::NaiveDate;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Minimum initial queue capacity (the queue grows on demand)
const MIN_QUEUE_CAPACITY: usize = 1;

/// Default worker pool size
const DEFAULT_WORKERS: usize = 8;

/// Parallel filesystem scanner with filterable plain/CSV/JSON output
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dirscan",
    version,
    about = "Parallel filesystem scanner with filterable plain/CSV/JSON output",
    long_about = "Concurrently walks a directory tree with a pool of worker threads,\n\
                  classifies every entry against the configured filters, and appends\n\
                  accepted records to an output file.",
    after_help = "EXAMPLES:\n    \
        dirscan /data -o scan.out\n    \
        dirscan /data -f csv -o scan.csv --extension txt --extension log\n    \
        dirscan /home -f json --min-size 1048576 --owner alice\n    \
        dirscan / -w 16 --modified-after 2026-01-01 --permissions 644"
)]
pub struct CliArgs {
    /// Directory to scan
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Output file for accepted records
    #[arg(short, long, default_value = "scan.out", value_name = "FILE")]
    pub output: PathBuf,

    /// Output encoding
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    /// Number of worker threads
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS, value_name = "NUM")]
    pub workers: usize,

    /// Initial work queue capacity (grows on demand)
    #[arg(long, default_value = "100", value_name = "NUM")]
    pub queue_capacity: usize,

    /// Include only entries with this extension (can be repeated)
    #[arg(long = "extension", value_name = "EXT", action = clap::ArgAction::Append)]
    pub extensions: Vec<String>,

    /// Include only entries at least this many bytes
    #[arg(long, value_name = "BYTES")]
    pub min_size: Option<u64>,

    /// Include only entries at most this many bytes
    #[arg(long, value_name = "BYTES")]
    pub max_size: Option<u64>,

    /// Include only entries owned by this user
    #[arg(long, value_name = "USER")]
    pub owner: Option<String>,

    /// Include only entries belonging to this group
    #[arg(long, value_name = "GROUP")]
    pub group: Option<String>,

    /// Include only entries modified on or after this date
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub modified_after: Option<String>,

    /// Include only entries modified on or before this date
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub modified_before: Option<String>,

    /// Include only entries with exactly these permission bits (octal)
    #[arg(long, value_name = "OCTAL")]
    pub permissions: Option<String>,

    /// Quiet mode - suppress banner and progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output (show per-entry errors)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output encoding for scan records
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Labeled block of lines per record
    Plain,
    /// One quoted CSV row per record, with a header
    Csv,
    /// One JSON object per line
    Json,
}

impl OutputFormat {
    /// Human-readable name for banners and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Plain => "plain",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Root directory to scan
    pub root: PathBuf,

    /// Output file path
    pub output_path: PathBuf,

    /// Output encoding
    pub format: OutputFormat,

    /// Number of worker threads
    pub worker_count: usize,

    /// Initial work queue capacity
    pub queue_capacity: usize,

    /// Compiled entry filters
    pub classifier: FileClassifier,

    /// Show banner and progress spinner
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl ScanConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        // Validate the scan root
        let root_meta = fs::metadata(&args.root).map_err(|e| ConfigError::InvalidRoot {
            path: args.root.clone(),
            reason: e.to_string(),
        })?;
        if !root_meta.is_dir() {
            return Err(ConfigError::InvalidRoot {
                path: args.root.clone(),
                reason: "not a directory".into(),
            });
        }

        // Validate worker count
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        // Validate queue capacity
        if args.queue_capacity < MIN_QUEUE_CAPACITY {
            return Err(ConfigError::InvalidQueueCapacity {
                capacity: args.queue_capacity,
                min: MIN_QUEUE_CAPACITY,
            });
        }

        // Validate size range
        if let (Some(min), Some(max)) = (args.min_size, args.max_size) {
            if min > max {
                return Err(ConfigError::InvalidSizeRange { min, max });
            }
        }

        // Validate output path
        if let Some(parent) = args.output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(ConfigError::InvalidOutputPath {
                    path: args.output.clone(),
                    reason: format!("Parent directory '{}' does not exist", parent.display()),
                });
            }
        }

        let classifier = FileClassifier {
            extensions: args
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            min_size: args.min_size,
            max_size: args.max_size,
            owner: args.owner,
            group: args.group,
            modified_after: args
                .modified_after
                .as_deref()
                .map(parse_date)
                .transpose()?,
            modified_before: args
                .modified_before
                .as_deref()
                .map(parse_date)
                .transpose()?,
            permissions: args
                .permissions
                .as_deref()
                .map(parse_permissions)
                .transpose()?,
        };

        Ok(Self {
            root: args.root,
            output_path: args.output,
            format: args.format,
            worker_count: args.workers,
            queue_capacity: args.queue_capacity,
            classifier,
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }
}

/// Parse a YYYY-MM-DD date into a Unix timestamp at midnight UTC
fn parse_date(value: &str) -> Result<i64, ConfigError> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        ConfigError::InvalidDate {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| ConfigError::InvalidDate {
        value: value.to_string(),
        reason: "not a valid timestamp".into(),
    })?;
    Ok(midnight.and_utc().timestamp())
}

/// Parse an octal permission string like "644" into mode bits
fn parse_permissions(value: &str) -> Result<u32, ConfigError> {
    let bits = u32::from_str_radix(value.trim_start_matches("0o"), 8).map_err(|e| {
        ConfigError::InvalidPermissions {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })?;
    if bits > 0o777 {
        return Err(ConfigError::InvalidPermissions {
            value: value.to_string(),
            reason: "exceeds 0777".into(),
        });
    }
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn base_args(root: PathBuf) -> CliArgs {
        CliArgs {
            root,
            output: PathBuf::from("scan.out"),
            format: OutputFormat::Plain,
            workers: 8,
            queue_capacity: 100,
            extensions: Vec::new(),
            min_size: None,
            max_size: None,
            owner: None,
            group: None,
            modified_after: None,
            modified_before: None,
            permissions: None,
            quiet: true,
            verbose: false,
        }
    }

    #[test]
    fn test_valid_config() {
        let dir = tempdir().unwrap();
        let config = ScanConfig::from_args(base_args(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.worker_count, 8);
        assert_eq!(config.format, OutputFormat::Plain);
        assert!(config.classifier.extensions.is_empty());
    }

    #[test]
    fn test_missing_root_rejected() {
        let err = ScanConfig::from_args(base_args(PathBuf::from("/no/such/dir/here")));
        assert!(matches!(err, Err(ConfigError::InvalidRoot { .. })));
    }

    #[test]
    fn test_worker_count_bounds() {
        let dir = tempdir().unwrap();

        let mut args = base_args(dir.path().to_path_buf());
        args.workers = 0;
        assert!(matches!(
            ScanConfig::from_args(args),
            Err(ConfigError::InvalidWorkerCount { .. })
        ));

        let mut args = base_args(dir.path().to_path_buf());
        args.workers = 10_000;
        assert!(matches!(
            ScanConfig::from_args(args),
            Err(ConfigError::InvalidWorkerCount { .. })
        ));
    }

    #[test]
    fn test_size_range_validation() {
        let dir = tempdir().unwrap();
        let mut args = base_args(dir.path().to_path_buf());
        args.min_size = Some(100);
        args.max_size = Some(10);
        assert!(matches!(
            ScanConfig::from_args(args),
            Err(ConfigError::InvalidSizeRange { min: 100, max: 10 })
        ));
    }

    #[test]
    fn test_extension_normalization() {
        let dir = tempdir().unwrap();
        let mut args = base_args(dir.path().to_path_buf());
        args.extensions = vec![".txt".into(), "log".into()];
        let config = ScanConfig::from_args(args).unwrap();
        assert_eq!(config.classifier.extensions, vec!["txt", "log"]);
    }

    #[test]
    fn test_parse_date() {
        // 2026-01-01T00:00:00Z
        assert_eq!(parse_date("2026-01-01").unwrap(), 1_767_225_600);
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("2026-13-40").is_err());
    }

    #[test]
    fn test_parse_permissions() {
        assert_eq!(parse_permissions("644").unwrap(), 0o644);
        assert_eq!(parse_permissions("0o755").unwrap(), 0o755);
        assert!(parse_permissions("1777").is_err());
        assert!(parse_permissions("rwx").is_err());
    }
}
