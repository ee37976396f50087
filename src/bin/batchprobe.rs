use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use batchprobe::catalog::{Framework, ModelCatalog};
use batchprobe::orchestrator::{Orchestrator, ProfileOptions};
use batchprobe::probe::{ImageGeometry, ProbeRunner};

#[derive(Parser, Debug)]
#[command(name = "batchprobe", version)]
#[command(about = "Find the maximum useful batch size for inference models", long_about = None)]
struct Cli {
    /// Framework name (caffe, caffe2, tensorflow, darknet); all frameworks if omitted
    #[arg(short, long)]
    framework: Option<String>,

    /// Model name; all catalog models in scope if omitted
    #[arg(short, long)]
    model: Option<String>,

    /// Model version
    #[arg(short = 'v', long, default_value_t = 1)]
    version: u32,

    /// GPU index
    #[arg(long, default_value_t = 0)]
    gpu: u32,

    /// Dataset directory
    #[arg(long)]
    dataset: PathBuf,

    /// Model root directory (catalog expected at <model_root>/db/model_db.yml)
    #[arg(long)]
    model_root: PathBuf,

    /// Fixed image height (requires --width)
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Fixed image width (requires --height)
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Path of the benchmarking executable
    #[arg(long, default_value = "profiler")]
    profiler: PathBuf,

    /// Directory receiving the per-model report files
    #[arg(long, default_value = ".")]
    report_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    batchprobe::logging::init_logging_default();
    let cli = Cli::parse();

    let framework = cli
        .framework
        .as_deref()
        .map(Framework::from_str)
        .transpose()?;

    let geometry = match (cli.height, cli.width) {
        (Some(height), Some(width)) => Some(ImageGeometry { height, width }),
        _ => None,
    };

    let catalog_path = ModelCatalog::default_path(&cli.model_root);
    let catalog = ModelCatalog::load(&catalog_path)?;

    let orchestrator = Orchestrator::new(
        catalog,
        ProbeRunner::new(cli.profiler),
        ProfileOptions {
            version: cli.version,
            gpu_index: cli.gpu,
            geometry,
            model_root: cli.model_root,
            image_dir: cli.dataset,
            report_dir: cli.report_dir,
        },
    );

    let summary = orchestrator.run(framework, cli.model.as_deref())?;

    if summary.is_empty() {
        println!("no catalog entries matched the selection");
        return Ok(());
    }
    for outcome in &summary.models {
        match &outcome.report {
            Some(path) => println!(
                "{}: max batch {} ({:?}), report {}",
                outcome.profile_id,
                outcome.search.chosen_batch,
                outcome.search.reason,
                path.display()
            ),
            None => println!(
                "{}: max batch {} ({:?}), report missing",
                outcome.profile_id, outcome.search.chosen_batch, outcome.search.reason
            ),
        }
    }
    Ok(())
}
