use crate::error::{JobError, Result};
use crate::types::{AssetName, JobId, ProcessingMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a job. The terminal variants carry their payload, so a finished
/// record holds either a result or an error, never both.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed {
        /// Stored name of the produced asset.
        result: AssetName,
        /// Whatever the worker wrote to stdout.
        output: String,
    },
    Failed {
        error: String,
    },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Processing)
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed { .. } => "completed",
            JobStatus::Failed { .. } => "failed",
        }
    }
}

/// Tracked state of one worker invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: JobId,
    /// Stored name of the input asset.
    pub asset: AssetName,
    #[serde(flatten)]
    pub mode: ProcessingMode,
    #[serde(flatten)]
    pub status: JobStatus,
    #[serde(rename = "startTime", with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,
    #[serde(
        rename = "finishTime",
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    pub fn new(id: JobId, asset: AssetName, mode: ProcessingMode) -> Self {
        Self {
            id,
            asset,
            mode,
            status: JobStatus::Processing,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Move the record into a terminal state. Only the first terminal write is accepted.
    pub(crate) fn finish(&mut self, status: JobStatus) -> Result<()> {
        if self.status.is_terminal() {
            return Err(JobError::AlreadyTerminal(self.id));
        }
        debug_assert!(status.is_terminal());
        self.status = status;
        self.finished_at = Some(Utc::now());
        Ok(())
    }
}
