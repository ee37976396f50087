//! Adaptive batch-size search
//!
//! Two-phase search for the largest useful batch size of one model:
//!
//! 1. **Exponential growth** — probe at doubling batch sizes starting from
//!    [`SearchConfig::growth_start`]. Stop early when a doubling improves
//!    throughput by less than the plateau ratio, or at the hard batch cap.
//! 2. **Bisection** — entered only when the growth phase hits out-of-memory:
//!    binary-search the window between the last good batch and the failing
//!    one to pin down the memory ceiling with O(log n) probes.
//!
//! Probes are issued through the [`ThroughputOracle`] seam so the search can
//! be exercised against scripted outcomes in tests and against the real
//! benchmarking executable in production. An unknown-failure outcome aborts
//! the search (and the whole run): once the executable violates its output
//! contract, no further measurement can be trusted.

use tracing::info;

use crate::error::{BatchProbeError, ProbeResult};
use crate::probe::BenchmarkOutcome;

/// Source of throughput measurements at a fixed batch size
pub trait ThroughputOracle {
    /// Measure one batch size. Spawn failures surface as errors; everything
    /// the benchmarking executable itself reports comes back as an outcome.
    fn probe(&mut self, batch: u32) -> ProbeResult<BenchmarkOutcome>;
}

/// Policy constants of the search
///
/// Defaults: growth starts at 64, doubling stops below a 1% throughput
/// gain, and no batch beyond 1024 is ever considered.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// First batch size probed by the growth phase
    pub growth_start: u32,
    /// Hard upper bound on any batch size
    pub batch_cap: u32,
    /// Minimum throughput ratio between doublings to keep growing
    pub plateau_ratio: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            growth_start: 64,
            batch_cap: 1024,
            plateau_ratio: 1.01,
        }
    }
}

impl SearchConfig {
    /// Create a config with default policy constants
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first batch size probed by the growth phase
    pub fn with_growth_start(mut self, growth_start: u32) -> Self {
        self.growth_start = growth_start;
        self
    }

    /// Set the hard upper bound on batch size
    pub fn with_batch_cap(mut self, batch_cap: u32) -> Self {
        self.batch_cap = batch_cap;
        self
    }

    /// Set the plateau ratio
    pub fn with_plateau_ratio(mut self, plateau_ratio: f64) -> Self {
        self.plateau_ratio = plateau_ratio;
        self
    }
}

/// Why the search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalReason {
    /// A doubling improved throughput by less than the plateau ratio
    Plateau,
    /// Out-of-memory was observed and the ceiling was bisected
    MemoryCeiling,
    /// Throughput kept improving up to the hard batch cap
    BatchCap,
}

/// Final decision of the search for one model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub chosen_batch: u32,
    pub reason: TerminalReason,
}

/// The two-phase batch-size search
#[derive(Debug, Clone, Default)]
pub struct BatchSearch {
    config: SearchConfig,
}

impl BatchSearch {
    /// Create a search with the given policy constants
    pub fn new(config: SearchConfig) -> Self {
        BatchSearch { config }
    }

    /// The policy constants in use
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the full search against an oracle.
    ///
    /// Batch sizes stay within `[1, batch_cap]`; the growth phase only
    /// visits powers of two (times `growth_start`).
    pub fn run(&self, oracle: &mut dyn ThroughputOracle) -> ProbeResult<SearchResult> {
        let mut left: u32 = 1;
        let mut right: u32 = self.config.growth_start;
        let mut prev_throughput: Option<f64> = None;

        // Phase 1: exponential growth.
        loop {
            match self.measure(oracle, right)? {
                Probed::OutOfMemory => {
                    info!(batch = right, "out of memory, bisecting ceiling");
                    break;
                }
                Probed::Throughput(curr) => {
                    info!(batch = right, throughput = curr, "growth probe");
                    if let Some(prev) = prev_throughput {
                        if curr / prev < self.config.plateau_ratio {
                            return Ok(SearchResult {
                                chosen_batch: right,
                                reason: TerminalReason::Plateau,
                            });
                        }
                    }
                    if right >= self.config.batch_cap {
                        return Ok(SearchResult {
                            chosen_batch: right,
                            reason: TerminalReason::BatchCap,
                        });
                    }
                    left = right;
                    right *= 2;
                    prev_throughput = Some(curr);
                }
            }
        }

        // Phase 2: bisection. `right` is known to run out of memory; `left`
        // is known to succeed, except for the initial 1 which stays untested
        // when the very first growth probe already exhausted memory.
        while right - left > 1 {
            let mid = (left + right) / 2;
            match self.measure(oracle, mid)? {
                Probed::OutOfMemory => {
                    info!(batch = mid, "bisection probe: out of memory");
                    right = mid;
                }
                Probed::Throughput(throughput) => {
                    info!(batch = mid, throughput, "bisection probe: ok");
                    left = mid;
                }
            }
        }

        Ok(SearchResult {
            chosen_batch: left,
            reason: TerminalReason::MemoryCeiling,
        })
    }

    fn measure(&self, oracle: &mut dyn ThroughputOracle, batch: u32) -> ProbeResult<Probed> {
        match oracle.probe(batch)? {
            BenchmarkOutcome::Success { throughput } => Ok(Probed::Throughput(throughput)),
            BenchmarkOutcome::OutOfMemory => Ok(Probed::OutOfMemory),
            BenchmarkOutcome::UnknownFailure { stderr } => {
                Err(BatchProbeError::BenchmarkFailed { batch, stderr })
            }
        }
    }
}

enum Probed {
    Throughput(f64),
    OutOfMemory,
}
