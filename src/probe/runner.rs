//! Synchronous execution of the benchmarking executable
//!
//! The runner launches one child process per probe and blocks until it
//! exits, draining both output streams in full. There is no retry and no
//! timeout: a hung benchmarking executable hangs the run, by design, and
//! a deterministic executable is assumed throughout.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::debug;

use crate::error::{BatchProbeError, ProbeResult};
use crate::probe::invocation::BenchmarkInvocation;

/// Captured output of one benchmarking run
///
/// Streams are decoded lossily; the classifier only looks for ASCII markers
/// and CSV rows, so replacement characters in unrelated output are harmless.
#[derive(Debug, Clone)]
pub struct RawOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Launches the benchmarking executable and captures its output
#[derive(Debug, Clone)]
pub struct ProbeRunner {
    profiler: PathBuf,
}

impl ProbeRunner {
    /// Create a runner for the given executable path
    pub fn new(profiler: impl Into<PathBuf>) -> Self {
        ProbeRunner {
            profiler: profiler.into(),
        }
    }

    /// Path of the executable this runner launches
    pub fn profiler(&self) -> &Path {
        &self.profiler
    }

    /// Run one invocation to completion, returning both streams.
    ///
    /// A process that cannot be started at all (not found, permissions) is a
    /// fatal configuration error; a process that starts and then fails is
    /// *not* — its streams are returned for the interpreter to classify.
    pub fn run(&self, invocation: &BenchmarkInvocation) -> ProbeResult<RawOutput> {
        let mut cmd = invocation.command(&self.profiler);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        debug!(profiler = %self.profiler.display(), args = ?invocation.args(), "launching benchmark");

        let output = cmd.output().map_err(|source| BatchProbeError::ProfilerSpawn {
            program: self.profiler.clone(),
            source,
        })?;

        Ok(RawOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
