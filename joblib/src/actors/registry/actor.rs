use super::messages::RegistryMessage;
use crate::error::{self, JobError};
use crate::record::{JobRecord, JobStatus};
use crate::types::{AssetName, JobId, ProcessingMode};
use std::collections::{hash_map::Entry, HashMap};
use tokio::sync::{mpsc, oneshot};

/// Owns every job record. Messages are handled one at a time, which serializes all
/// inserts and terminal writes.
pub struct JobRegistry {
    inbox: mpsc::Receiver<RegistryMessage>,
    jobs: HashMap<JobId, JobRecord>,
}

impl JobRegistry {
    pub fn spawn(inbox: mpsc::Receiver<RegistryMessage>) {
        let actor = Self {
            inbox,
            jobs: HashMap::new(),
        };
        tokio::spawn(async move { actor.run().await });
    }

    async fn run(mut self) {
        use self::RegistryMessage::*;
        while let Some(msg) = self.inbox.recv().await {
            match msg {
                Create {
                    job_id,
                    asset,
                    mode,
                    response,
                } => {
                    self.create(job_id, asset, mode, response);
                }
                Get { job_id, response } => {
                    let _ = response.send(self.get(job_id));
                }
                List { response } => {
                    let _ = response.send(Ok(self.jobs.values().cloned().collect()));
                }
                Finish {
                    job_id,
                    status,
                    response,
                } => {
                    let _ = response.send(self.finish(job_id, status));
                }
            }
        }
        tracing::debug!(jobs = self.jobs.len(), "job registry stopped");
    }

    fn create(
        &mut self,
        job_id: JobId,
        asset: AssetName,
        mode: ProcessingMode,
        response: oneshot::Sender<error::Result<JobRecord>>,
    ) {
        let result = match self.jobs.entry(job_id) {
            Entry::Occupied(_) => Err(JobError::DuplicateId(job_id)),
            Entry::Vacant(slot) => Ok(slot.insert(JobRecord::new(job_id, asset, mode)).clone()),
        };
        let _ = response.send(result);
    }

    fn get(&self, job_id: JobId) -> error::Result<JobRecord> {
        self.jobs
            .get(&job_id)
            .cloned()
            .ok_or_else(|| JobError::job_not_found(job_id))
    }

    fn finish(&mut self, job_id: JobId, status: JobStatus) -> error::Result<()> {
        let record = self
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| JobError::job_not_found(job_id))?;
        let label = status.label();
        record.finish(status).map_err(|err| {
            tracing::warn!(%job_id, attempted = label, "ignoring second terminal write");
            err
        })
    }
}
