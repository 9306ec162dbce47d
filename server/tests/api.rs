//! HTTP-level tests: the full router with a shell script standing in for the worker.

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use joblib::{AssetStore, Orchestrator, WorkerConfig};
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "X-TEST-BOUNDARY";

/// Copies the input to `<stem>_Processed.<ext>`, like the real worker.
const COPY_WORKER: &str = r#"ext="${1##*.}"; cp "$1" "${1%.*}_Processed.$ext""#;

async fn build_app(script: &str, max_bytes: usize) -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let store = AssetStore::open(dir.path().join("uploads"), max_bytes)
        .await
        .unwrap();
    let worker = WorkerConfig {
        program: "sh".into(),
        args: vec!["-c".into(), script.into(), "worker".into()],
        working_dir: dir.path().to_path_buf(),
        output_limit: 4096,
    };
    let app = server::router(Orchestrator::spawn(store, worker, 16));
    (dir, app)
}

fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(app: &Router, field: &str, filename: &str, data: &[u8]) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, filename, data)))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

async fn wait_terminal(app: &Router, job_id: &str) -> Value {
    for _ in 0..400 {
        let response = get(app, &format!("/api/status/{job_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let job = body_json(response).await;
        if job["status"] != "processing" {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("job {job_id} did not finish in time");
}

#[tokio::test]
async fn health_endpoints() {
    let (_dir, app) = build_app(COPY_WORKER, 1024).await;

    let json = body_json(get(&app, "/").await).await;
    assert_eq!(json["status"], "ok");

    let json = body_json(get(&app, "/api").await).await;
    assert_eq!(json["endpoints"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn upload_process_poll_download() {
    let (_dir, app) = build_app(COPY_WORKER, 1024).await;

    let response = upload(&app, "image", "cat.png", b"cat pixels").await;
    assert_eq!(response.status(), StatusCode::OK);
    let uploaded = body_json(response).await;
    let image_id = uploaded["imageId"].as_str().unwrap().to_string();
    let image_name = uploaded["imageName"].as_str().unwrap().to_string();
    assert_eq!(image_name, format!("{image_id}.png"));
    assert_eq!(uploaded["filename"], "cat.png");
    assert!(uploaded["path"].as_str().unwrap().ends_with(&image_name));

    let response = post_json(
        &app,
        "/api/process",
        json!({ "imageId": image_name, "light": true, "heavy": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let started = body_json(response).await;
    assert_eq!(started["status"], "processing");
    let job_id = started["jobId"].as_str().unwrap().to_string();

    let job = wait_terminal(&app, &job_id).await;
    let expected = format!("{image_id}_Processed.png");
    assert_eq!(job["status"], "completed");
    assert_eq!(job["result"], json!(expected));
    assert_eq!(job["id"], json!(job_id));
    assert_eq!(job["light"], true);
    assert!(job.get("error").is_none());

    let response = get(&app, &format!("/api/download/{expected}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(body_bytes(response).await, b"cat pixels");

    let jobs = body_json(get(&app, "/api/jobs").await).await;
    assert_eq!(jobs.as_array().unwrap().len(), 1);
    assert_eq!(jobs[0]["id"], json!(job_id));
}

#[tokio::test]
async fn failed_job_reports_stderr() {
    let (_dir, app) = build_app("echo 'bad format' >&2; exit 1", 1024).await;
    let uploaded = body_json(upload(&app, "image", "cat.jpg", b"x").await).await;

    let started = body_json(
        post_json(
            &app,
            "/api/process",
            json!({ "imageId": uploaded["imageName"], "heavy": true }),
        )
        .await,
    )
    .await;
    let job = wait_terminal(&app, started["jobId"].as_str().unwrap()).await;
    assert_eq!(job["status"], "failed");
    assert_eq!(job["error"], "bad format");
    assert!(job.get("result").is_none());
}

#[tokio::test]
async fn upload_without_image_field_is_400() {
    let (_dir, app) = build_app(COPY_WORKER, 1024).await;
    let response = upload(&app, "file", "cat.png", b"x").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file uploaded");
}

#[tokio::test]
async fn text_field_named_image_is_not_a_file() {
    let (_dir, app) = build_app(COPY_WORKER, 1024).await;
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file uploaded");
}

#[tokio::test]
async fn non_image_uploads_download_unchanged() {
    let (_dir, app) = build_app(COPY_WORKER, 1024).await;
    for original in ["notes.txt", "backup.part", "README"] {
        let response = upload(&app, "image", original, b"plain bytes").await;
        assert_eq!(response.status(), StatusCode::OK, "{original}");
        let uploaded = body_json(response).await;
        let name = uploaded["imageName"].as_str().unwrap();

        let response = get(&app, &format!("/api/download/{name}")).await;
        assert_eq!(
            response.status(),
            StatusCode::OK,
            "{original} stored as {name}"
        );
        assert_eq!(body_bytes(response).await, b"plain bytes");
    }
}

#[tokio::test]
async fn oversized_upload_is_413() {
    let (_dir, app) = build_app(COPY_WORKER, 16).await;
    let response = upload(&app, "image", "big.png", &[7u8; 32]).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn process_missing_image_is_404_and_creates_no_job() {
    let (_dir, app) = build_app(COPY_WORKER, 1024).await;
    let response = post_json(
        &app,
        "/api/process",
        json!({ "imageId": "0123456789abcdef.png", "light": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let jobs = body_json(get(&app, "/api/jobs").await).await;
    assert!(jobs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn process_unsupported_image_is_400() {
    let (_dir, app) = build_app(COPY_WORKER, 1024).await;
    let uploaded = body_json(upload(&app, "image", "notes.txt", b"x").await).await;
    let response = post_json(
        &app,
        "/api/process",
        json!({ "imageId": uploaded["imageName"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn process_with_bad_json_is_400() {
    let (_dir, app) = build_app(COPY_WORKER, 1024).await;
    let response = post_json(&app, "/api/process", json!({ "light": true })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_job_is_404() {
    let (_dir, app) = build_app(COPY_WORKER, 1024).await;
    let unknown = joblib::JobId::now_v7();
    let response = get(&app, &format!("/api/status/{unknown}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&app, "/api/status/not-a-job").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_missing_file_is_404() {
    let (_dir, app) = build_app(COPY_WORKER, 1024).await;
    let response = get(&app, "/api/download/nothing.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&app, "/api/download/..%2Fsecret").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
