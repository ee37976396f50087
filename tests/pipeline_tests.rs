//! End-to-end tests driving the orchestrator against a fake benchmarking
//! executable (a shell script honoring the documented flag contract).

#![cfg(unix)]

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use batchprobe::catalog::{Framework, ModelCatalog};
use batchprobe::error::BatchProbeError;
use batchprobe::orchestrator::{Orchestrator, ProfileOptions};
use batchprobe::probe::ProbeRunner;
use batchprobe::search::TerminalReason;

/// Shared flag-parsing preamble for every fake profiler script
const SCRIPT_PREAMBLE: &str = r#"#!/bin/sh
batch=0
output=""
while [ $# -gt 0 ]; do
  case "$1" in
    -min_batch) batch="$2"; shift 2 ;;
    -output) output="$2"; shift 2 ;;
    *) shift ;;
  esac
done
"#;

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake_profiler.sh");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "{}{}", SCRIPT_PREAMBLE, body).unwrap();
    drop(file);
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn write_catalog(model_root: &Path, yaml: &str) {
    let db_dir = model_root.join("db");
    std::fs::create_dir_all(&db_dir).unwrap();
    std::fs::write(db_dir.join("model_db.yml"), yaml).unwrap();
}

fn setup(script_body: &str, catalog_yaml: &str) -> (TempDir, Orchestrator) {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), script_body);
    let model_root = dir.path().join("models");
    write_catalog(&model_root, catalog_yaml);
    let catalog = ModelCatalog::load(&ModelCatalog::default_path(&model_root)).unwrap();

    let orchestrator = Orchestrator::new(
        catalog,
        ProbeRunner::new(script),
        ProfileOptions {
            version: 1,
            gpu_index: 0,
            geometry: None,
            model_root,
            image_dir: dir.path().join("dataset"),
            report_dir: dir.path().to_path_buf(),
        },
    );
    (dir, orchestrator)
}

const ONE_MODEL: &str = "models:\n  - framework: tensorflow\n    model_name: resnet50\n";

#[test]
fn memory_ceiling_run_produces_report() {
    // Constant per-request latency: throughput scales linearly with batch,
    // so growth never plateaus; memory runs out above batch 200.
    let body = r#"
if [ "$batch" -gt 200 ]; then
  echo "cudaMalloc failed: out of memory" >&2
  exit 1
fi
echo "batch,latency,std"
echo "$batch,500,50"
if [ -n "$output" ]; then
  echo "report for batch $batch" > "$output"
fi
"#;
    let (dir, orchestrator) = setup(body, ONE_MODEL);

    let summary = orchestrator.run(None, None).unwrap();
    assert_eq!(summary.models.len(), 1);

    let outcome = &summary.models[0];
    assert_eq!(outcome.profile_id, "tensorflow:resnet50:1");
    assert_eq!(outcome.search.chosen_batch, 200);
    assert_eq!(outcome.search.reason, TerminalReason::MemoryCeiling);

    let report = outcome.report.as_ref().expect("report file should exist");
    assert_eq!(report, &dir.path().join("tensorflow:resnet50:1.txt"));
    let contents = std::fs::read_to_string(report).unwrap();
    assert_eq!(contents, "report for batch 200\n");
}

#[test]
fn plateau_run_stops_at_flat_throughput() {
    // Latency proportional to batch: throughput is flat, so the second
    // growth probe already plateaus at batch 128.
    let body = r#"
echo "batch,latency,std"
echo "$batch,$((batch * 10)),0"
if [ -n "$output" ]; then
  echo "report for batch $batch" > "$output"
fi
"#;
    let (_dir, orchestrator) = setup(body, ONE_MODEL);

    let summary = orchestrator.run(None, None).unwrap();
    let outcome = &summary.models[0];
    assert_eq!(outcome.search.chosen_batch, 128);
    assert_eq!(outcome.search.reason, TerminalReason::Plateau);
    assert!(outcome.report.is_some());
}

#[test]
fn missing_report_is_nonfatal_and_run_continues() {
    // Succeeds but never writes the report file; with two catalog models the
    // second one must still be profiled.
    let body = r#"
echo "batch,latency,std"
echo "$batch,$((batch * 10)),0"
"#;
    let catalog = "models:
  - framework: caffe
    model_name: alexnet
  - framework: caffe
    model_name: vgg16
";
    let (_dir, orchestrator) = setup(body, catalog);

    let summary = orchestrator.run(Some(Framework::Caffe), None).unwrap();
    assert_eq!(summary.models.len(), 2);
    assert_eq!(summary.missing_reports(), 2);
    assert!(summary.models.iter().all(|m| m.report.is_none()));
}

#[test]
fn unknown_output_aborts_the_run() {
    let body = r#"
echo "unexpected banner"
echo "cannot load model weights" >&2
exit 3
"#;
    let (_dir, orchestrator) = setup(body, ONE_MODEL);

    let err = orchestrator.run(None, None).unwrap_err();
    match err {
        BatchProbeError::BenchmarkFailed { batch, stderr } => {
            assert_eq!(batch, 64); // first growth probe
            assert!(stderr.contains("cannot load model weights"));
        }
        other => panic!("expected BenchmarkFailed, got {:?}", other),
    }
}

#[test]
fn selection_of_absent_model_is_noop() {
    let body = r#"
echo "batch,latency,std"
echo "$batch,500,50"
"#;
    let (_dir, orchestrator) = setup(body, ONE_MODEL);

    let summary = orchestrator
        .run(Some(Framework::Tensorflow), Some("vgg16"))
        .unwrap();
    assert!(summary.is_empty());
}
