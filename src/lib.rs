//! dirscan - Parallel Filesystem Scanner
//!
//! Concurrently enumerates a directory tree with a fixed pool of worker
//! threads sharing one dynamically-growing work queue, classifies every
//! discovered entry against configurable filters, and appends accepted
//! records to a plain, CSV, or JSON output file.
//!
//! # Features
//!
//! - **Parallel traversal**: worker threads pull pending directories from a
//!   shared FIFO queue and push newly found subdirectories back.
//!
//! - **Automatic termination**: the scan ends as soon as no enumeration is
//!   in progress anywhere and no pending directories remain; no central
//!   poller is involved.
//!
//! - **Cooperative cancellation**: Ctrl-C requests a shutdown that every
//!   worker observes at its next blocking wait or loop iteration.
//!
//! - **Per-entry filtering**: extension, size, owner, group, modification
//!   time, and permission filters over a single link-aware stat per entry.
//!
//! # Example
//!
//! ```bash
//! # Scan /data into a CSV, 8 workers
//! dirscan /data -f csv -o scan.csv
//!
//! # Only large log files owned by alice
//! dirscan /var/log --extension log --min-size 1048576 --owner alice -f json
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod progress;
pub mod scanner;

pub use config::{CliArgs, OutputFormat, ScanConfig};
pub use error::{Result, ScanError};
pub use filter::FileClassifier;
pub use output::{EntryKind, FileRecord, OutputSink};
pub use scanner::{ScanCoordinator, ScanResult};
