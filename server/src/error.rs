use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use joblib::JobError;
use serde_json::json;

/// Error type for HTTP handlers.
///
/// Implements [`IntoResponse`] so every failure leaves as `{"error", "code"}` JSON.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Job(#[from] JobError),

    /// The multipart body could not be read (including exceeding the body limit).
    #[error(transparent)]
    Multipart(#[from] MultipartError),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        JobError::MalformedRequest(rejection.body_text()).into()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Job(err) => match err {
                JobError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
                JobError::MalformedRequest(_) | JobError::UnsupportedAsset(_) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
                }
                JobError::TooLarge { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "TOO_LARGE", err.to_string())
                }
                JobError::DuplicateId(_) | JobError::AlreadyTerminal(_) => {
                    (StatusCode::CONFLICT, "CONFLICT", err.to_string())
                }
                JobError::Storage(_) | JobError::RegistryClosed => {
                    tracing::error!(error = %err, "internal error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },
            AppError::Multipart(err) => {
                let status = err.status();
                let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "TOO_LARGE"
                } else {
                    "BAD_REQUEST"
                };
                (status, code, err.body_text())
            }
        };

        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}
