mod actor;
mod messages;

use self::{
    actor::JobRegistry,
    messages::RegistryMessage::{self, Create, Finish, Get, List},
};
use crate::error::{self, JobError};
use crate::record::{JobRecord, JobStatus};
use crate::types::{AssetName, JobId, ProcessingMode};
use tokio::sync::{mpsc, oneshot};

/// A `JobRegistry` which maps job ids to their records.
///
/// This struct is an actor handle: the map itself lives in the actor spawned by
/// `JobRegistryHandle::spawn`, and every operation is a message to it. Handles can be
/// cloned freely across tasks without an `Arc<Mutex>`. The actor stops once every
/// handle has been dropped.
#[derive(Clone)]
pub struct JobRegistryHandle {
    sender: mpsc::Sender<RegistryMessage>,
}

impl JobRegistryHandle {
    /// Spawn a new, empty registry.
    ///
    /// `message_capacity` bounds the actor's mailbox, limiting the build-up of inbound messages.
    pub fn spawn(message_capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(message_capacity);
        JobRegistry::spawn(receiver);
        Self { sender }
    }

    /// Insert a fresh `processing` record. Fails with `DuplicateId` if `job_id` is taken.
    pub async fn create(
        &self,
        job_id: JobId,
        asset: AssetName,
        mode: ProcessingMode,
    ) -> error::Result<JobRecord> {
        self.request(|response| Create {
            job_id,
            asset,
            mode,
            response,
        })
        .await
    }

    pub async fn get(&self, job_id: JobId) -> error::Result<JobRecord> {
        self.request(|response| Get { job_id, response }).await
    }

    /// Point-in-time snapshot of every record, in no particular order.
    pub async fn list(&self) -> error::Result<Vec<JobRecord>> {
        self.request(|response| List { response }).await
    }

    pub async fn complete(
        &self,
        job_id: JobId,
        result: AssetName,
        output: String,
    ) -> error::Result<()> {
        self.finish(job_id, JobStatus::Completed { result, output })
            .await
    }

    pub async fn fail(&self, job_id: JobId, error: String) -> error::Result<()> {
        self.finish(job_id, JobStatus::Failed { error }).await
    }

    async fn finish(&self, job_id: JobId, status: JobStatus) -> error::Result<()> {
        self.request(|response| Finish {
            job_id,
            status,
            response,
        })
        .await
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<error::Result<T>>) -> RegistryMessage,
    ) -> error::Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(message(tx))
            .await
            .map_err(|_| JobError::RegistryClosed)?;
        rx.await.map_err(|_| JobError::RegistryClosed)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn mode() -> ProcessingMode {
        ProcessingMode::new(true, false)
    }

    #[tokio::test]
    async fn create_then_get() {
        let registry = JobRegistryHandle::spawn(8);
        let job_id = Uuid::now_v7();
        let created = registry.create(job_id, "a.png".into(), mode()).await.unwrap();
        let fetched = registry.get(job_id).await.unwrap();
        assert_eq!(created, fetched);
        assert_eq!(fetched.status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let registry = JobRegistryHandle::spawn(8);
        let job_id = Uuid::now_v7();
        registry.create(job_id, "a.png".into(), mode()).await.unwrap();
        let err = registry
            .create(job_id, "b.png".into(), mode())
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::DuplicateId(id) if id == job_id));
        assert_eq!(registry.get(job_id).await.unwrap().asset, "a.png");
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let registry = JobRegistryHandle::spawn(8);
        let job_id = Uuid::now_v7();
        assert!(matches!(
            registry.get(job_id).await,
            Err(JobError::NotFound { kind: "job", .. })
        ));
        assert!(matches!(
            registry.fail(job_id, "boom".into()).await,
            Err(JobError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn terminal_state_is_final() {
        let registry = JobRegistryHandle::spawn(8);
        let job_id = Uuid::now_v7();
        registry.create(job_id, "a.png".into(), mode()).await.unwrap();
        registry
            .complete(job_id, "a_Processed.png".into(), "ok".into())
            .await
            .unwrap();

        let err = registry.fail(job_id, "late".into()).await.unwrap_err();
        assert!(matches!(err, JobError::AlreadyTerminal(_)));
        let err = registry
            .complete(job_id, "other.png".into(), String::new())
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::AlreadyTerminal(_)));

        let record = registry.get(job_id).await.unwrap();
        assert_eq!(
            record.status,
            JobStatus::Completed {
                result: "a_Processed.png".into(),
                output: "ok".into()
            }
        );
        assert!(record.finished_at.is_some());
    }

    #[tokio::test]
    async fn list_sees_every_job() {
        let registry = JobRegistryHandle::spawn(4);
        let creates = (0..32).map(|i| {
            let registry = registry.clone();
            tokio::spawn(async move {
                let job_id = Uuid::now_v7();
                registry
                    .create(job_id, format!("{i}.png"), mode())
                    .await
                    .unwrap();
                job_id
            })
        });
        let mut ids = Vec::new();
        for handle in creates {
            ids.push(handle.await.unwrap());
        }

        let listed = registry.list().await.unwrap();
        assert_eq!(listed.len(), 32);
        for id in ids {
            assert!(listed.iter().any(|record| record.id == id));
        }
    }
}
