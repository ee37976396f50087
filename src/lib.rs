//! batchprobe - adaptive batch-size search for inference benchmarking
//!
//! Given an inference model and an accelerator, batchprobe finds the largest
//! per-request batch size that still improves throughput and fits in device
//! memory. It drives an external benchmarking executable as a black box:
//! batch sizes grow exponentially until throughput plateaus or memory runs
//! out, a binary search then pins down the exact memory ceiling, and one
//! final detailed profiling run is issued at the chosen batch size.
//!
//! The crate never runs inference itself; the benchmarking executable and
//! its report format are opaque external collaborators.

pub mod catalog;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod probe;
pub mod search;

pub use catalog::{Framework, ModelCatalog, ModelRecord};
pub use error::{BatchProbeError, ErrorCategory, ProbeResult};
pub use orchestrator::{ModelOutcome, Orchestrator, ProfileOptions, RunSummary};
pub use probe::{
    BenchmarkInvocation, BenchmarkOutcome, ImageGeometry, ProbeRunner, ProfileRequest, RawOutput,
};
pub use search::{BatchSearch, SearchConfig, SearchResult, TerminalReason, ThroughputOracle};
