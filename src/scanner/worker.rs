//! Worker thread logic for the parallel scan
//!
//! Each worker:
//! - Pulls directory paths from the shared work queue
//! - Enumerates the directory with link-aware stats (one per entry)
//! - Runs every entry through the classifier and writes accepted records
//! - Pushes subdirectories back onto the work queue
//! - Releases its in-flight slot and runs the termination check

use crate::error::WorkerError;
use crate::filter::FileClassifier;
use crate::output::{FileRecord, OutputSink};
use crate::scanner::queue::WorkQueue;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace, warn};

/// Counters owned by a single worker; aggregated after the pool joins
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    /// Non-directory entries seen
    pub files_seen: u64,

    /// Directory entries seen (and requeued)
    pub dirs_seen: u64,
}

/// A worker thread that processes directory work items
pub struct Worker {
    id: usize,
    handle: Option<JoinHandle<WorkerStats>>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        queue: Arc<WorkQueue>,
        classifier: Arc<FileClassifier>,
        sink: Arc<OutputSink>,
    ) -> Result<Self, WorkerError> {
        let handle = thread::Builder::new()
            .name(format!("dirscan-{id}"))
            .spawn(move || worker_loop(id, queue, classifier, sink))
            .map_err(|e| WorkerError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to finish and collect its counters
    pub fn join(mut self) -> Result<WorkerStats, WorkerError> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| WorkerError::Panicked { id: self.id }),
            None => Ok(WorkerStats::default()),
        }
    }
}

/// Main worker loop: dequeue, enumerate, requeue, account
fn worker_loop(
    id: usize,
    queue: Arc<WorkQueue>,
    classifier: Arc<FileClassifier>,
    sink: Arc<OutputSink>,
) -> WorkerStats {
    debug!(worker = id, "Worker starting");
    let mut stats = WorkerStats::default();

    while !queue.is_shutdown() {
        let Some(dir) = queue.pop() else { break };

        // The pop above already marked this enumeration as in flight, so
        // children pushed below can never make the queue look complete
        // while this directory is still being read.
        scan_directory(id, &dir, &queue, &classifier, &sink, &mut stats);

        if queue.finish() {
            debug!(worker = id, "No pending or in-flight work remains, ending scan");
        }
    }

    debug!(
        worker = id,
        files = stats.files_seen,
        dirs = stats.dirs_seen,
        "Worker shutting down"
    );
    stats
}

/// Enumerate a single directory.
///
/// Failures are per-entry: an unreadable directory or an unstattable entry
/// is logged and skipped, and the rest of the scan is unaffected.
fn scan_directory(
    worker_id: usize,
    dir: &Path,
    queue: &WorkQueue,
    classifier: &FileClassifier,
    sink: &OutputSink,
    stats: &mut WorkerStats,
) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                worker = worker_id,
                path = %dir.display(),
                error = %e,
                "Failed to open directory"
            );
            return;
        }
    };

    for entry in entries {
        // Cancellation is observed between entries, never mid-entry
        if queue.is_shutdown() {
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(
                    worker = worker_id,
                    path = %dir.display(),
                    error = %e,
                    "Failed to read directory entry"
                );
                continue;
            }
        };

        let path = entry.path();
        let meta = match fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(e) => {
                warn!(
                    worker = worker_id,
                    path = %path.display(),
                    error = %e,
                    "Failed to stat entry"
                );
                continue;
            }
        };

        // Both files and directories are eligible for output
        if classifier.matches(&path, &meta) {
            let record = FileRecord::from_metadata(&path, &meta);
            if let Err(e) = sink.write(&record) {
                error!(
                    worker = worker_id,
                    path = %path.display(),
                    error = %e,
                    "Failed to write record"
                );
            }
        }

        if meta.is_dir() {
            stats.dirs_seen += 1;
            queue.push(path);
        } else {
            stats.files_seen += 1;
        }
    }

    trace!(worker = worker_id, path = %dir.display(), "Directory processed");
}

/// Sum per-worker counters into pool totals
pub fn aggregate_stats(stats: &[WorkerStats]) -> (u64, u64) {
    let files = stats.iter().map(|s| s.files_seen).sum();
    let dirs = stats.iter().map(|s| s.dirs_seen).sum();
    (files, dirs)
}
