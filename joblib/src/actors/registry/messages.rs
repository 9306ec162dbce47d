use crate::error;
use crate::record::{JobRecord, JobStatus};
use crate::types::{AssetName, JobId, ProcessingMode};
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum RegistryMessage {
    Create {
        job_id: JobId,
        asset: AssetName,
        mode: ProcessingMode,
        response: oneshot::Sender<error::Result<JobRecord>>,
    },
    Get {
        job_id: JobId,
        response: oneshot::Sender<error::Result<JobRecord>>,
    },
    List {
        response: oneshot::Sender<error::Result<Vec<JobRecord>>>,
    },
    /// The single terminal write for a job: completion and failure share this path.
    Finish {
        job_id: JobId,
        status: JobStatus,
        response: oneshot::Sender<error::Result<()>>,
    },
}
