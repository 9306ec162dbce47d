mod actors;
pub mod assets;
pub mod error;
pub mod naming;
mod orchestrator;
pub mod record;
pub mod types;

// re-export the registry handle as if it is the registry itself.
pub use actors::registry::JobRegistryHandle as JobRegistry;
pub use actors::supervisor::{ExecutorSupervisor, WorkerConfig, DEFAULT_OUTPUT_LIMIT};
pub use assets::{AssetRef, AssetStore, DEFAULT_MAX_ASSET_BYTES};
pub use error::JobError;
pub use orchestrator::Orchestrator;
pub use record::{JobRecord, JobStatus};
pub use types::{JobId, ProcessingMode};
