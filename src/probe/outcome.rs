//! Classification of benchmarking output
//!
//! The benchmarking executable's text contract is fragile, so it is parsed
//! in exactly one place. On success the executable prints a CSV header line
//! `batch,latency,...` followed by a data row whose 2nd and 3rd fields are
//! mean and standard deviation of latency in microseconds. On memory
//! exhaustion it emits the substring `out of memory` on either stream.
//! Anything else is an unknown failure, which callers treat as fatal: the
//! interpreter fails closed rather than guessing at a format.

use crate::probe::runner::RawOutput;

/// Marker emitted by the executable when the device runs out of memory
const OOM_MARKER: &str = "out of memory";

/// CSV header that precedes the latency data row
const LATENCY_HEADER: &str = "batch,latency";

/// Classified result of one benchmarking run
#[derive(Debug, Clone, PartialEq)]
pub enum BenchmarkOutcome {
    /// The probe completed; throughput in requests per second
    Success { throughput: f64 },
    /// The device ran out of memory — an expected search signal, not an error
    OutOfMemory,
    /// Output matched no known format; carries raw stderr for diagnostics
    UnknownFailure { stderr: String },
}

/// Classify the raw output of a probe at the given batch size.
///
/// The out-of-memory check runs first and wins regardless of any other
/// content. The header scan takes the *first* matching line; throughput is
/// `batch * 1e6 / (mean + std)` with latencies in microseconds.
pub fn classify(batch: u32, output: &RawOutput) -> BenchmarkOutcome {
    if output.stdout.contains(OOM_MARKER) || output.stderr.contains(OOM_MARKER) {
        return BenchmarkOutcome::OutOfMemory;
    }

    match parse_latency(&output.stdout) {
        Some((mean, std)) => BenchmarkOutcome::Success {
            throughput: batch as f64 * 1e6 / (mean + std),
        },
        None => BenchmarkOutcome::UnknownFailure {
            stderr: output.stderr.clone(),
        },
    }
}

/// Find the first `batch,latency` header and pull (mean, std) from the row
/// that follows it. Returns None when the contract is not met.
fn parse_latency(stdout: &str) -> Option<(f64, f64)> {
    let mut lines = stdout.lines();
    lines.find(|line| line.starts_with(LATENCY_HEADER))?;
    let row = lines.next()?;
    let mut fields = row.split(',');
    fields.next()?; // batch column
    let mean: f64 = fields.next()?.trim().parse().ok()?;
    let std: f64 = fields.next()?.trim().parse().ok()?;
    Some((mean, std))
}
