//! Error types for dirscan
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - include context about what to do
//! - Entry-level I/O failures are handled (logged and skipped) inside the
//!   worker that hit them and never surface through these types

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the dirscan application
#[derive(Error, Debug)]
pub enum ScanError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors (output file creation, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid queue capacity
    #[error("Invalid queue capacity {capacity}: must be at least {min}")]
    InvalidQueueCapacity { capacity: usize, min: usize },

    /// min-size is larger than max-size
    #[error("Invalid size range: min {min} exceeds max {max}")]
    InvalidSizeRange { min: u64, max: u64 },

    /// Date filter could not be parsed
    #[error("Invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    /// Permission filter could not be parsed
    #[error("Invalid permissions '{value}': {reason}")]
    InvalidPermissions { value: String, reason: String },

    /// Scan root is missing or not a directory
    #[error("Invalid scan root '{path}': {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    /// Output path error
    #[error("Invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: PathBuf, reason: String },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker thread could not be spawned
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker panicked
    #[error("Worker {id} panicked")]
    Panicked { id: usize },
}

/// Result type alias for ScanError
pub type Result<T> = std::result::Result<T, ScanError>;
