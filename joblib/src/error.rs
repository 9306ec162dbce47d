use crate::types::JobId;
use std::{io, result};

#[derive(thiserror::Error, Debug)]
pub enum JobError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("job {0} already exists")]
    DuplicateId(JobId),
    #[error("job {0} has already finished")]
    AlreadyTerminal(JobId),
    #[error("asset is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },
    #[error("asset storage failed: {0}")]
    Storage(#[from] io::Error),
    #[error("unsupported asset {0}: expected a jpg, jpeg or png image")]
    UnsupportedAsset(String),
    #[error("{0}")]
    MalformedRequest(String),
    #[error("job registry has shut down")]
    RegistryClosed,
}

impl JobError {
    pub(crate) fn job_not_found(job_id: JobId) -> Self {
        Self::NotFound {
            kind: "job",
            id: job_id.to_string(),
        }
    }

    pub(crate) fn asset_not_found(name: &str) -> Self {
        Self::NotFound {
            kind: "asset",
            id: name.to_string(),
        }
    }
}

pub type Result<T> = result::Result<T, JobError>;
