use super::capture::CapturedOutput;
use crate::actors::registry::JobRegistryHandle;
use crate::naming;
use crate::record::JobStatus;
use crate::types::{AssetName, JobId};

use bytes::BytesMut;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Child,
};

const CHUNK_SIZE: usize = 4096;
const GENERIC_FAILURE: &str = "Processing failed";

/// Supervision of one running worker. Drains both pipes, waits for the exit and
/// records the outcome in the registry exactly once.
pub struct Supervision {
    job_id: JobId,
    asset: AssetName,
    registry: JobRegistryHandle,
    output_limit: usize,
}

impl Supervision {
    pub fn spawn(
        job_id: JobId,
        asset: AssetName,
        child: Child,
        registry: JobRegistryHandle,
        output_limit: usize,
    ) {
        let task = Self {
            job_id,
            asset,
            registry,
            output_limit,
        };
        tokio::spawn(async move { task.run(child).await });
    }

    async fn run(self, mut child: Child) {
        // grab stdout and stderr, they are always piped by the supervisor
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (exit_status, stdout, stderr) = futures::future::join3(
            child.wait(),
            drain(stdout, self.output_limit, self.job_id, "stdout"),
            drain(stderr, self.output_limit, self.job_id, "stderr"),
        )
        .await;

        let status = outcome(&self.asset, exit_status, stdout, stderr);
        match &status {
            JobStatus::Completed { result, .. } => {
                tracing::info!(job_id = %self.job_id, %result, "worker finished");
            }
            JobStatus::Failed { error } => {
                tracing::warn!(job_id = %self.job_id, %error, "worker failed");
            }
            JobStatus::Processing => unreachable!("outcome is always terminal"),
        }
        self.report(status).await;
    }

    async fn report(&self, status: JobStatus) {
        let written = match status {
            JobStatus::Completed { result, output } => {
                self.registry.complete(self.job_id, result, output).await
            }
            JobStatus::Failed { error } => self.registry.fail(self.job_id, error).await,
            JobStatus::Processing => return,
        };
        if let Err(err) = written {
            tracing::error!(job_id = %self.job_id, error = %err, "could not record job outcome");
        }
    }
}

/// Read a pipe to EOF, capturing up to `limit` bytes of it.
async fn drain<R>(
    pipe: Option<R>,
    limit: usize,
    job_id: JobId,
    stream: &'static str,
) -> CapturedOutput
where
    R: AsyncRead + Unpin,
{
    let mut captured = CapturedOutput::new(limit);
    let Some(mut pipe) = pipe else {
        return captured;
    };
    let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
    loop {
        buf.reserve(CHUNK_SIZE);
        match pipe.read_buf(&mut buf).await {
            Ok(n) if n > 0 => {
                // move the bytes out of buf before the next read
                let chunk = buf.split().freeze();
                tracing::debug!(
                    %job_id,
                    stream,
                    text = %String::from_utf8_lossy(&chunk),
                    "worker output"
                );
                captured.push(&chunk);
            }
            Ok(_) => break,
            Err(err) => {
                tracing::warn!(%job_id, stream, error = %err, "stopped reading worker output");
                break;
            }
        }
    }
    captured
}

/// Collapse a worker exit into a terminal job status.
///
/// Exit code 0 completes the job; anything else (non-zero code, signal, wait error)
/// fails it with the captured stderr, or a generic message when stderr was empty.
pub(crate) fn outcome(
    asset: &str,
    exit_status: io::Result<ExitStatus>,
    stdout: CapturedOutput,
    stderr: CapturedOutput,
) -> JobStatus {
    match exit_status {
        Ok(exit) if exit.success() => match naming::processed_name(asset) {
            Ok(result) => JobStatus::Completed {
                result,
                output: stdout.into_text(),
            },
            Err(err) => JobStatus::Failed {
                error: err.to_string(),
            },
        },
        Ok(exit) => {
            tracing::debug!(
                code = ?exit.code(),
                signal = ?exit.signal(),
                "worker exited unsuccessfully"
            );
            JobStatus::Failed {
                error: failure_message(stderr),
            }
        }
        Err(err) => JobStatus::Failed {
            error: format!("failed to wait for worker: {err}"),
        },
    }
}

fn failure_message(stderr: CapturedOutput) -> String {
    let text = stderr.into_text();
    let text = text.trim();
    if text.is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        text.to_string()
    }
}
