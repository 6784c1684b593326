//! Scan coordinator - owns the queue, seeds the root, drives the pool
//!
//! The coordinator is responsible for:
//! - Building the shared work queue and output sink
//! - Seeding the queue with the root path before workers start
//! - Spawning and joining the worker pool
//! - Exposing the shutdown trigger for signal handlers
//! - Aggregating per-worker statistics after the pool joins

use crate::config::ScanConfig;
use crate::error::Result;
use crate::filter::FileClassifier;
use crate::output::OutputSink;
use crate::scanner::queue::WorkQueue;
use crate::scanner::worker::{aggregate_stats, Worker, WorkerStats};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Result of a completed (or interrupted) scan
#[derive(Debug)]
pub struct ScanResult {
    /// Total non-directory entries seen
    pub total_files: u64,

    /// Total directory entries seen
    pub total_dirs: u64,

    /// Per-worker counters, index = worker id
    pub per_worker: Vec<WorkerStats>,

    /// Wall-clock time for the scan
    pub duration: Duration,

    /// Whether the scan drained all work (vs was interrupted)
    pub completed: bool,
}

/// Coordinates the parallel filesystem scan
pub struct ScanCoordinator {
    config: Arc<ScanConfig>,
    queue: Arc<WorkQueue>,
}

impl ScanCoordinator {
    /// Create a new coordinator from a validated configuration
    pub fn new(config: ScanConfig) -> Self {
        let queue = Arc::new(WorkQueue::with_capacity(config.queue_capacity));
        Self {
            config: Arc::new(config),
            queue,
        }
    }

    /// Handle for requesting shutdown (for signal handlers)
    pub fn cancel_handle(&self) -> Arc<WorkQueue> {
        Arc::clone(&self.queue)
    }

    /// Run the scan to completion or cancellation
    pub fn run(self) -> Result<ScanResult> {
        let start = Instant::now();

        info!(
            root = %self.config.root.display(),
            workers = self.config.worker_count,
            format = self.config.format.as_str(),
            "Starting scan"
        );

        let classifier = Arc::new(self.config.classifier.clone());
        let sink = Arc::new(OutputSink::create(
            &self.config.output_path,
            self.config.format,
        )?);

        // Seed before the pool starts so the first pop always finds work
        self.queue.push(self.config.root.clone());

        let workers = self.spawn_workers(&classifier, &sink)?;
        info!(count = workers.len(), "Workers spawned");

        let mut per_worker = Vec::with_capacity(workers.len());
        for worker in workers {
            let id = worker.id();
            match worker.join() {
                Ok(stats) => {
                    info!(
                        worker = id,
                        files = stats.files_seen,
                        dirs = stats.dirs_seen,
                        "Worker finished"
                    );
                    per_worker.push(stats);
                }
                Err(e) => {
                    warn!(worker = id, error = %e, "Worker failed to join cleanly");
                    per_worker.push(WorkerStats::default());
                }
            }
        }

        sink.flush()?;

        let duration = start.elapsed();
        let completed = self.queue.completed();
        let (total_files, total_dirs) = aggregate_stats(&per_worker);

        info!(
            files = total_files,
            dirs = total_dirs,
            duration_secs = duration.as_secs(),
            completed = completed,
            "Scan finished"
        );

        Ok(ScanResult {
            total_files,
            total_dirs,
            per_worker,
            duration,
            completed,
        })
    }

    /// Spawn the worker pool; on failure, shut down and join what started
    fn spawn_workers(
        &self,
        classifier: &Arc<FileClassifier>,
        sink: &Arc<OutputSink>,
    ) -> Result<Vec<Worker>> {
        let mut workers = Vec::with_capacity(self.config.worker_count);
        for id in 0..self.config.worker_count {
            match Worker::spawn(
                id,
                Arc::clone(&self.queue),
                Arc::clone(classifier),
                Arc::clone(sink),
            ) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    self.queue.request_shutdown();
                    for worker in workers {
                        let _ = worker.join();
                    }
                    return Err(e.into());
                }
            }
        }
        Ok(workers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use std::fs;
    use tempfile::tempdir;

    fn config_for(root: &std::path::Path, output: &std::path::Path) -> ScanConfig {
        ScanConfig {
            root: root.to_path_buf(),
            output_path: output.to_path_buf(),
            format: OutputFormat::Json,
            worker_count: 4,
            queue_capacity: 2,
            classifier: FileClassifier::accept_all(),
            show_progress: false,
            verbose: false,
        }
    }

    #[test]
    fn test_scan_example_tree() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("a.txt"), vec![0u8; 10]).unwrap();
        fs::create_dir(root.path().join("sub")).unwrap();
        fs::write(root.path().join("sub/b.log"), vec![0u8; 500]).unwrap();

        let out = tempdir().unwrap();
        let output = out.path().join("scan.json");

        let coordinator = ScanCoordinator::new(config_for(root.path(), &output));
        let result = coordinator.run().unwrap();

        assert!(result.completed);
        assert_eq!(result.total_files, 2);
        assert_eq!(result.total_dirs, 1);

        let records = fs::read_to_string(&output).unwrap();
        assert_eq!(records.lines().count(), 3);
    }

    #[test]
    fn test_empty_root_completes() {
        let root = tempdir().unwrap();
        let out = tempdir().unwrap();
        let output = out.path().join("scan.json");

        let coordinator = ScanCoordinator::new(config_for(root.path(), &output));
        let result = coordinator.run().unwrap();

        assert!(result.completed);
        assert_eq!(result.total_files, 0);
        assert_eq!(result.total_dirs, 0);
        assert_eq!(result.per_worker.len(), 4);
    }

    #[test]
    fn test_cancellation_before_start() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("a.txt"), b"x").unwrap();

        let out = tempdir().unwrap();
        let output = out.path().join("scan.json");

        let coordinator = ScanCoordinator::new(config_for(root.path(), &output));
        coordinator.cancel_handle().request_shutdown();
        let result = coordinator.run().unwrap();

        assert!(!result.completed);
        assert_eq!(result.total_files, 0);
        assert_eq!(result.total_dirs, 0);
    }
}
