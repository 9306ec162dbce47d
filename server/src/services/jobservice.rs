use crate::error::AppResult;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use joblib::{JobError, JobId, JobRecord, Orchestrator, ProcessingMode};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

const UPLOAD_FIELD: &str = "image";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Generated id, without extension.
    pub image_id: String,
    /// Stored name; this is what `/api/process` takes as `imageId`.
    pub image_name: String,
    /// Name the client uploaded the file under.
    pub filename: String,
    pub path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub image_id: String,
    #[serde(flatten)]
    pub mode: ProcessingMode,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub job_id: JobId,
    pub status: String,
}

/// POST /api/upload
///
/// Multipart form with the file in the `image` field.
pub async fn upload(
    State(orchestrator): State<Orchestrator>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        // A plain form value under the same name is not a file.
        let Some(filename) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let data = field.bytes().await?;
        let asset = orchestrator.submit_asset(&data, &filename).await?;
        return Ok(Json(UploadResponse {
            image_id: asset.id,
            image_name: asset.stored_name,
            filename,
            path: asset.path.display().to_string(),
        }));
    }
    Err(JobError::MalformedRequest("No file uploaded".into()).into())
}

/// POST /api/process
///
/// Starts a job and answers right away; the job is polled through `/api/status`.
pub async fn process(
    State(orchestrator): State<Orchestrator>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> AppResult<Json<ProcessResponse>> {
    let Json(request) = payload?;
    let job_id = orchestrator
        .start_job(&request.image_id, request.mode)
        .await?;
    Ok(Json(ProcessResponse {
        job_id,
        status: "processing".into(),
    }))
}

/// GET /api/status/{job_id}
pub async fn status(
    State(orchestrator): State<Orchestrator>,
    Path(job_id): Path<String>,
) -> AppResult<Json<JobRecord>> {
    // an id that does not parse cannot name a job
    let job_id = JobId::parse_str(&job_id).map_err(|_| JobError::NotFound {
        kind: "job",
        id: job_id.clone(),
    })?;
    Ok(Json(orchestrator.get_status(job_id).await?))
}

/// GET /api/jobs
///
/// Every known job, newest first.
pub async fn jobs(State(orchestrator): State<Orchestrator>) -> AppResult<Json<Vec<JobRecord>>> {
    let mut jobs = orchestrator.list_jobs().await?;
    jobs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    Ok(Json(jobs))
}

/// GET /api/download/{filename}
pub async fn download(
    State(orchestrator): State<Orchestrator>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let (file, len) = orchestrator.download_asset(&filename).await?;
    let headers = [
        (header::CONTENT_TYPE, content_type(&filename).to_string()),
        (header::CONTENT_LENGTH, len.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

fn content_type(filename: &str) -> &'static str {
    let ext = filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
