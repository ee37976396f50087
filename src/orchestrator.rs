//! Per-model profiling orchestration
//!
//! For every selected (framework, model) pair, the orchestrator runs the
//! batch-size search, then issues one final high-fidelity benchmarking run
//! at the chosen batch with an explicit `-output` path and verifies that the
//! report file actually appeared. Models are processed strictly one after
//! another; the GPU device is assumed to be exclusively ours for the whole
//! run.
//!
//! A missing report file is a per-model failure: the tail of the
//! executable's stderr is logged and the run moves on. Everything else that
//! goes wrong (catalog, spawn, contract violations) aborts the run.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::catalog::{Framework, ModelCatalog};
use crate::error::ProbeResult;
use crate::probe::{
    classify, BenchmarkInvocation, BenchmarkOutcome, ImageGeometry, ProbeRunner, ProfileRequest,
};
use crate::search::{BatchSearch, SearchResult, ThroughputOracle};

/// How many trailing stderr lines to surface when a report goes missing
const STDERR_TAIL_LINES: usize = 50;

/// Run-wide settings threaded from the CLI down to every invocation
#[derive(Debug, Clone)]
pub struct ProfileOptions {
    /// Model version recorded in the profile id
    pub version: u32,
    /// GPU device index handed to the benchmarking executable
    pub gpu_index: u32,
    /// Fixed input geometry, when pinned by the operator
    pub geometry: Option<ImageGeometry>,
    /// Model root directory (also hosts the catalog)
    pub model_root: PathBuf,
    /// Dataset directory fed to the executable
    pub image_dir: PathBuf,
    /// Directory receiving `<profile_id>.txt` report files
    pub report_dir: PathBuf,
}

/// Result of profiling one model
#[derive(Debug, Clone)]
pub struct ModelOutcome {
    pub profile_id: String,
    pub search: SearchResult,
    /// Path of the report file, or None when the executable failed to
    /// produce one (non-fatal)
    pub report: Option<PathBuf>,
}

/// What an orchestrator run accomplished
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub models: Vec<ModelOutcome>,
}

impl RunSummary {
    /// Number of models whose final report file never appeared
    pub fn missing_reports(&self) -> usize {
        self.models.iter().filter(|m| m.report.is_none()).count()
    }

    /// True when the selection matched no catalog entries
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Production oracle: one benchmarking subprocess per probe
struct ProfilerOracle<'a> {
    runner: &'a ProbeRunner,
    request: &'a ProfileRequest,
}

impl ThroughputOracle for ProfilerOracle<'_> {
    fn probe(&mut self, batch: u32) -> ProbeResult<BenchmarkOutcome> {
        let invocation = BenchmarkInvocation::fixed_batch(self.request, batch);
        let raw = self.runner.run(&invocation)?;
        Ok(classify(batch, &raw))
    }
}

/// Sequential driver over the selected catalog entries
#[derive(Debug)]
pub struct Orchestrator {
    catalog: ModelCatalog,
    runner: ProbeRunner,
    search: BatchSearch,
    options: ProfileOptions,
}

impl Orchestrator {
    /// Create an orchestrator with default search policy
    pub fn new(catalog: ModelCatalog, runner: ProbeRunner, options: ProfileOptions) -> Self {
        Orchestrator {
            catalog,
            runner,
            search: BatchSearch::default(),
            options,
        }
    }

    /// Override the search policy
    pub fn with_search(mut self, search: BatchSearch) -> Self {
        self.search = search;
        self
    }

    /// Profile every model matched by the selection, one at a time.
    ///
    /// An empty selection (e.g. a model name absent from the catalog) is a
    /// successful no-op.
    pub fn run(
        &self,
        framework: Option<Framework>,
        model: Option<&str>,
    ) -> ProbeResult<RunSummary> {
        let selected = self.catalog.select(framework, model);
        info!(models = selected.len(), "starting profiling run");

        let mut summary = RunSummary::default();
        for record in selected {
            let request = ProfileRequest {
                framework: record.framework,
                model_name: record.model_name.clone(),
                version: self.options.version,
                gpu_index: self.options.gpu_index,
                geometry: self.options.geometry,
                model_root: self.options.model_root.clone(),
                image_dir: self.options.image_dir.clone(),
            };
            summary.models.push(self.profile_model(&request)?);
        }
        Ok(summary)
    }

    /// Search one model, then run the final detailed profiling pass
    fn profile_model(&self, request: &ProfileRequest) -> ProbeResult<ModelOutcome> {
        let profile_id = request.profile_id();
        info!(%profile_id, "profiling model");

        let mut oracle = ProfilerOracle {
            runner: &self.runner,
            request,
        };
        let search = self.search.run(&mut oracle)?;
        info!(
            %profile_id,
            batch = search.chosen_batch,
            reason = ?search.reason,
            "batch search finished"
        );

        let report_path = self
            .options
            .report_dir
            .join(format!("{}.txt", profile_id));
        let invocation =
            BenchmarkInvocation::profiling_run(request, search.chosen_batch, report_path.clone());
        let raw = self.runner.run(&invocation)?;

        let report = if report_path.exists() {
            Some(report_path)
        } else {
            warn!(
                %profile_id,
                path = %report_path.display(),
                "profiling run produced no report file:\n{}",
                stderr_tail(&raw.stderr, STDERR_TAIL_LINES)
            );
            None
        };

        Ok(ModelOutcome {
            profile_id,
            search,
            report,
        })
    }
}

/// Last `n` lines of a stderr stream, for diagnostics
fn stderr_tail(stderr: &str, n: usize) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
