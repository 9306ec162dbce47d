use anyhow::{bail, Context};
use joblib::{JobId, JobRecord, JobStatus};
use reqwest::{multipart, Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    image_name: String,
    filename: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessResponse {
    job_id: JobId,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

pub struct ClientCli {
    inner: Client,
    base: String,
    interval: Duration,
}

impl ClientCli {
    pub fn connect(server_addr: &str, interval: Duration) -> Self {
        Self {
            inner: Client::new(),
            base: server_addr.trim_end_matches('/').to_string(),
            interval,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base, path)
    }

    pub async fn upload(&self, path: &Path) -> anyhow::Result<()> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let form = multipart::Form::new()
            .part("image", multipart::Part::bytes(data).file_name(filename));
        let response = self
            .inner
            .post(self.url("upload"))
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadResponse = checked(response).await?.json().await?;
        println!("Uploaded {} as {}", uploaded.filename, uploaded.image_name);
        Ok(())
    }

    pub async fn process(
        &self,
        image_id: &str,
        light: bool,
        heavy: bool,
        wait: bool,
    ) -> anyhow::Result<()> {
        let response = self
            .inner
            .post(self.url("process"))
            .json(&json!({ "imageId": image_id, "light": light, "heavy": heavy }))
            .send()
            .await?;
        let started: ProcessResponse = checked(response).await?.json().await?;
        println!("Started job id: {}", started.job_id);
        if wait {
            self.wait(started.job_id).await?;
        }
        Ok(())
    }

    pub async fn query_status(&self, job_id: JobId) -> anyhow::Result<()> {
        let job = self.fetch(job_id).await?;
        print_job(&job);
        Ok(())
    }

    /// Poll at the configured interval until the job reaches a terminal state.
    pub async fn wait(&self, job_id: JobId) -> anyhow::Result<()> {
        let job = loop {
            let job = self.fetch(job_id).await?;
            if job.status.is_terminal() {
                break job;
            }
            tokio::time::sleep(self.interval).await;
        };
        print_job(&job);
        if let JobStatus::Failed { error } = job.status {
            bail!("job {job_id} failed: {error}");
        }
        Ok(())
    }

    pub async fn list_jobs(&self) -> anyhow::Result<()> {
        let response = self.inner.get(self.url("jobs")).send().await?;
        let jobs: Vec<JobRecord> = checked(response).await?.json().await?;
        if jobs.is_empty() {
            println!("No jobs");
        }
        for job in &jobs {
            println!(
                "{}  {:<10}  {}  {}",
                job.id,
                job.status.label(),
                job.started_at.format("%H:%M:%S"),
                job.asset
            );
        }
        Ok(())
    }

    pub async fn download(&self, filename: &str, out: Option<&Path>) -> anyhow::Result<()> {
        let response = self
            .inner
            .get(self.url(&format!("download/{filename}")))
            .send()
            .await?;
        let bytes = checked(response).await?.bytes().await?;
        let out = out.unwrap_or_else(|| Path::new(filename));
        tokio::fs::write(out, &bytes)
            .await
            .with_context(|| format!("failed to write {}", out.display()))?;
        println!("Saved {} bytes to {}", bytes.len(), out.display());
        Ok(())
    }

    async fn fetch(&self, job_id: JobId) -> anyhow::Result<JobRecord> {
        let response = self
            .inner
            .get(self.url(&format!("status/{job_id}")))
            .send()
            .await?;
        Ok(checked(response).await?.json().await?)
    }
}

/// Turn an error response into an error carrying the server's message.
async fn checked(response: Response) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    bail!("server responded {status}: {message}")
}

fn print_job(job: &JobRecord) {
    match &job.status {
        JobStatus::Processing => println!("Processing"),
        JobStatus::Completed { result, output } => {
            println!("Completed: {result}");
            if !output.trim().is_empty() {
                println!("{}", output.trim_end());
            }
        }
        JobStatus::Failed { error } => println!("Failed: {error}"),
    }
}
