//! Driving the external benchmarking executable
//!
//! This module owns the whole boundary with the black-box benchmarking
//! executable: building its command line ([`invocation`]), running it as a
//! synchronous child process ([`runner`]), and classifying its raw output
//! into a [`BenchmarkOutcome`] ([`outcome`]). The rest of the crate never
//! touches raw process text.

pub mod invocation;
pub mod outcome;
pub mod runner;

pub use invocation::{BenchmarkInvocation, ImageGeometry, ProfileRequest};
pub use outcome::{classify, BenchmarkOutcome};
pub use runner::{ProbeRunner, RawOutput};
