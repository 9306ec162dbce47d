use crate::actors::registry::JobRegistryHandle;
use crate::actors::supervisor::{ExecutorSupervisor, WorkerConfig};
use crate::assets::{AssetRef, AssetStore};
use crate::error::Result;
use crate::naming;
use crate::record::JobRecord;
use crate::types::{JobId, ProcessingMode};
use tokio::fs::File;
use uuid::Uuid;

/// Boundary operations of the job service: submit assets, start jobs, and read back
/// job state and produced assets.
///
/// Cheap to clone; clones share the same store, registry and supervisor.
#[derive(Clone)]
pub struct Orchestrator {
    store: AssetStore,
    registry: JobRegistryHandle,
    supervisor: ExecutorSupervisor,
}

impl Orchestrator {
    pub fn new(
        store: AssetStore,
        registry: JobRegistryHandle,
        supervisor: ExecutorSupervisor,
    ) -> Self {
        Self {
            store,
            registry,
            supervisor,
        }
    }

    /// Wire up a fresh registry and a supervisor for `worker` around `store`.
    pub fn spawn(store: AssetStore, worker: WorkerConfig, registry_capacity: usize) -> Self {
        let registry = JobRegistryHandle::spawn(registry_capacity);
        let supervisor = ExecutorSupervisor::new(worker, registry.clone());
        Self::new(store, registry, supervisor)
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    pub async fn submit_asset(&self, bytes: &[u8], filename: &str) -> Result<AssetRef> {
        self.store.store(bytes, filename).await
    }

    /// Start a job for the stored asset `asset` and return its id without waiting for
    /// the worker.
    ///
    /// Nothing is recorded when the asset is missing or has no derivable output name.
    pub async fn start_job(&self, asset: &str, mode: ProcessingMode) -> Result<JobId> {
        let asset_path = self.store.locate(asset).await?;
        naming::processed_name(asset)?;

        let job_id = Uuid::now_v7();
        self.registry.create(job_id, asset.to_string(), mode).await?;
        self.supervisor.launch(job_id, asset, &asset_path, mode).await;
        Ok(job_id)
    }

    pub async fn get_status(&self, job_id: JobId) -> Result<JobRecord> {
        self.registry.get(job_id).await
    }

    pub async fn list_jobs(&self) -> Result<Vec<JobRecord>> {
        self.registry.list().await
    }

    pub async fn download_asset(&self, name: &str) -> Result<(File, u64)> {
        self.store.retrieve(name).await
    }
}
