//! Unified error handling for batchprobe
//!
//! This module provides a single error type covering the failure taxonomy of
//! the profiling driver:
//! - Configuration errors (catalog unreadable or malformed, benchmarking
//!   executable unspawnable) — fatal, abort the entire run
//! - Benchmark errors (the executable produced output outside its contract) —
//!   fatal, the results cannot be trusted for any model
//! - I/O errors from plumbing around the above
//!
//! Out-of-memory is deliberately *not* represented here: it is an expected
//! signal consumed by the batch search and lives in
//! [`crate::probe::BenchmarkOutcome`]. A missing report file after the final
//! profiling run is likewise not an error — it is logged per model and the
//! run continues.

use std::fmt;
use std::path::PathBuf;

/// Unified error type for batchprobe
#[derive(Debug, thiserror::Error)]
pub enum BatchProbeError {
    /// Model catalog file could not be read
    #[error("failed to read model catalog {path}: {source}")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Model catalog document is malformed or missing required fields
    #[error("malformed model catalog {path}: {message}")]
    CatalogParse { path: PathBuf, message: String },

    /// A framework name outside the supported set was requested
    #[error("unknown framework: {0} (expected caffe, caffe2, tensorflow or darknet)")]
    UnknownFramework(String),

    /// The benchmarking executable could not be started at all
    #[error("failed to spawn benchmarking executable {program}: {source}")]
    ProfilerSpawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The benchmarking executable produced output outside its contract.
    /// A single such observation is treated as systemic, not transient.
    #[error("benchmark run at batch {batch} failed with unrecognized output:\n{stderr}")]
    BenchmarkFailed { batch: u32, stderr: String },

    /// Other I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BatchProbeError {
    /// Categorize the error for exit-path decisions
    pub fn category(&self) -> ErrorCategory {
        match self {
            BatchProbeError::CatalogRead { .. }
            | BatchProbeError::CatalogParse { .. }
            | BatchProbeError::UnknownFramework(_)
            | BatchProbeError::ProfilerSpawn { .. } => ErrorCategory::Config,
            BatchProbeError::BenchmarkFailed { .. } => ErrorCategory::Benchmark,
            BatchProbeError::Io(_) => ErrorCategory::Io,
        }
    }

    /// Check if this is a configuration error (operator-fixable setup issue)
    pub fn is_config(&self) -> bool {
        matches!(self.category(), ErrorCategory::Config)
    }
}

/// Error category for exit-path decisions
///
/// Every category is fatal for the whole run; the category only affects how
/// the failure is reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Setup problem: catalog or executable, fix the environment
    Config,
    /// The benchmarking executable violated its output contract
    Benchmark,
    /// Plumbing I/O failure
    Io,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::Benchmark => write!(f, "Benchmark"),
            ErrorCategory::Io => write!(f, "Io"),
        }
    }
}

/// Result alias used throughout the crate
pub type ProbeResult<T> = std::result::Result<T, BatchProbeError>;
