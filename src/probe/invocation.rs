//! Command-line construction for the benchmarking executable
//!
//! The executable's flag contract:
//!
//! ```text
//! -model_root <dir> -image_dir <dir> -gpu <int> -framework <name> -model <name>
//!   [-height <int> -width <int>]
//!   -min_batch <int> -max_batch <int>
//!   [-output <path>]
//! ```
//!
//! [`BenchmarkInvocation`] is transient: one value per subprocess call.
//! Every probe issued by the batch search uses a fixed batch
//! (`min_batch == max_batch`); the final profiling run additionally passes
//! `-output` so the executable writes its report file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::catalog::Framework;

/// Fixed input geometry, when the operator pins one
///
/// Height and width always travel together; the CLI enforces both-or-neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageGeometry {
    pub height: u32,
    pub width: u32,
}

/// Everything needed to benchmark one model, minus the batch size
///
/// Constructed once per (framework, model) pair and threaded by reference
/// from the orchestrator down to the runner. Immutable.
#[derive(Debug, Clone)]
pub struct ProfileRequest {
    pub framework: Framework,
    pub model_name: String,
    pub version: u32,
    pub gpu_index: u32,
    pub geometry: Option<ImageGeometry>,
    pub model_root: PathBuf,
    pub image_dir: PathBuf,
}

impl ProfileRequest {
    /// Identifier used for logging and for naming the report file:
    /// `framework:model:version`, with `:HxW` appended when geometry is pinned.
    pub fn profile_id(&self) -> String {
        let mut id = format!("{}:{}:{}", self.framework, self.model_name, self.version);
        if let Some(geometry) = self.geometry {
            id.push_str(&format!(":{}x{}", geometry.height, geometry.width));
        }
        id
    }
}

/// One fully-formed call to the benchmarking executable
#[derive(Debug, Clone)]
pub struct BenchmarkInvocation {
    pub framework: Framework,
    pub model_name: String,
    pub gpu_index: u32,
    pub geometry: Option<ImageGeometry>,
    pub model_root: PathBuf,
    pub image_dir: PathBuf,
    pub min_batch: u32,
    pub max_batch: u32,
    pub output: Option<PathBuf>,
}

impl BenchmarkInvocation {
    /// A single-batch probe (`min_batch == max_batch`), as issued by the search
    pub fn fixed_batch(request: &ProfileRequest, batch: u32) -> Self {
        BenchmarkInvocation {
            framework: request.framework,
            model_name: request.model_name.clone(),
            gpu_index: request.gpu_index,
            geometry: request.geometry,
            model_root: request.model_root.clone(),
            image_dir: request.image_dir.clone(),
            min_batch: batch,
            max_batch: batch,
            output: None,
        }
    }

    /// The final high-fidelity run at the chosen batch, writing a report file
    pub fn profiling_run(request: &ProfileRequest, batch: u32, output: PathBuf) -> Self {
        BenchmarkInvocation {
            output: Some(output),
            ..Self::fixed_batch(request, batch)
        }
    }

    /// Build the child-process command for a given executable path
    pub fn command(&self, profiler: &Path) -> Command {
        let mut cmd = Command::new(profiler);
        cmd.args(self.args());
        cmd
    }

    /// The argument list, in the order the executable documents it
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-model_root".into(),
            self.model_root.clone().into(),
            "-image_dir".into(),
            self.image_dir.clone().into(),
            "-gpu".into(),
            self.gpu_index.to_string().into(),
            "-framework".into(),
            self.framework.as_str().into(),
            "-model".into(),
            self.model_name.clone().into(),
        ];
        if let Some(geometry) = self.geometry {
            args.push("-height".into());
            args.push(geometry.height.to_string().into());
            args.push("-width".into());
            args.push(geometry.width.to_string().into());
        }
        args.push("-min_batch".into());
        args.push(self.min_batch.to_string().into());
        args.push("-max_batch".into());
        args.push(self.max_batch.to_string().into());
        if let Some(output) = &self.output {
            args.push("-output".into());
            args.push(output.clone().into());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> ProfileRequest {
        ProfileRequest {
            framework: Framework::Tensorflow,
            model_name: "resnet50".to_string(),
            version: 1,
            gpu_index: 0,
            geometry: None,
            model_root: PathBuf::from("/srv/models"),
            image_dir: PathBuf::from("/data/imagenet/val"),
        }
    }

    fn args_as_strings(invocation: &BenchmarkInvocation) -> Vec<String> {
        invocation
            .args()
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn test_fixed_batch_args() {
        let request = sample_request();
        let invocation = BenchmarkInvocation::fixed_batch(&request, 64);
        let args = args_as_strings(&invocation);
        assert_eq!(
            args,
            vec![
                "-model_root",
                "/srv/models",
                "-image_dir",
                "/data/imagenet/val",
                "-gpu",
                "0",
                "-framework",
                "tensorflow",
                "-model",
                "resnet50",
                "-min_batch",
                "64",
                "-max_batch",
                "64",
            ]
        );
    }

    #[test]
    fn test_geometry_flags() {
        let mut request = sample_request();
        request.geometry = Some(ImageGeometry {
            height: 224,
            width: 224,
        });
        let invocation = BenchmarkInvocation::fixed_batch(&request, 8);
        let args = args_as_strings(&invocation);
        let height_pos = args.iter().position(|a| a == "-height").unwrap();
        assert_eq!(args[height_pos + 1], "224");
        assert_eq!(args[height_pos + 2], "-width");
        assert_eq!(args[height_pos + 3], "224");
        // Geometry flags come before the batch flags
        let min_pos = args.iter().position(|a| a == "-min_batch").unwrap();
        assert!(height_pos < min_pos);
    }

    #[test]
    fn test_profiling_run_appends_output() {
        let request = sample_request();
        let invocation =
            BenchmarkInvocation::profiling_run(&request, 192, PathBuf::from("out.txt"));
        assert_eq!(invocation.min_batch, 192);
        assert_eq!(invocation.max_batch, 192);
        let args = args_as_strings(&invocation);
        assert_eq!(args[args.len() - 2], "-output");
        assert_eq!(args[args.len() - 1], "out.txt");
    }

    #[test]
    fn test_command_program() {
        let request = sample_request();
        let invocation = BenchmarkInvocation::fixed_batch(&request, 1);
        let cmd = invocation.command(Path::new("/opt/bench/profiler"));
        assert_eq!(cmd.get_program(), "/opt/bench/profiler");
    }

    #[test]
    fn test_profile_id() {
        let mut request = sample_request();
        assert_eq!(request.profile_id(), "tensorflow:resnet50:1");
        request.version = 3;
        request.geometry = Some(ImageGeometry {
            height: 299,
            width: 299,
        });
        assert_eq!(request.profile_id(), "tensorflow:resnet50:3:299x299");
    }
}
