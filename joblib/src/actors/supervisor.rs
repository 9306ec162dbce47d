mod capture;
mod task;

use crate::actors::registry::JobRegistryHandle;
use crate::types::{JobId, ProcessingMode};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use task::Supervision;
use tokio::process;

pub const DEFAULT_OUTPUT_LIMIT: usize = 1024 * 1024;

/// How to invoke the external worker.
///
/// A job runs `program args... <asset path> [--light] [--heavy]` inside `working_dir`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerConfig {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Cap on captured bytes per output stream.
    pub output_limit: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            program: "uv".into(),
            args: vec!["run".into(), "python".into(), "main.py".into()],
            working_dir: PathBuf::from("."),
            output_limit: DEFAULT_OUTPUT_LIMIT,
        }
    }
}

/// Launches one worker process per job and records each outcome in the registry.
///
/// There is no admission control: every launch starts a process immediately.
#[derive(Clone)]
pub struct ExecutorSupervisor {
    config: WorkerConfig,
    registry: JobRegistryHandle,
}

impl ExecutorSupervisor {
    pub fn new(config: WorkerConfig, registry: JobRegistryHandle) -> Self {
        Self { config, registry }
    }

    /// Start the worker for `job_id` and return without waiting for it.
    ///
    /// The caller must have created the job record and checked that `asset_path`
    /// exists. A worker that cannot be spawned is recorded as a failed job.
    pub async fn launch(
        &self,
        job_id: JobId,
        asset: &str,
        asset_path: &Path,
        mode: ProcessingMode,
    ) {
        let mut command = process::Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .arg(asset_path)
            .args(mode.flags())
            .current_dir(&self.config.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        match command.spawn() {
            Ok(child) => {
                tracing::info!(
                    %job_id,
                    asset,
                    pid = ?child.id(),
                    light = mode.light,
                    heavy = mode.heavy,
                    "worker started"
                );
                Supervision::spawn(
                    job_id,
                    asset.to_string(),
                    child,
                    self.registry.clone(),
                    self.config.output_limit,
                );
            }
            Err(err) => {
                tracing::error!(
                    %job_id,
                    program = %self.config.program,
                    error = %err,
                    "failed to spawn worker"
                );
                let message = format!("failed to launch worker `{}`: {err}", self.config.program);
                if let Err(err) = self.registry.fail(job_id, message).await {
                    tracing::error!(%job_id, error = %err, "could not record launch failure");
                }
            }
        }
    }
}
