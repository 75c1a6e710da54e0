use super::error::ApiError;
use super::types::{StatusReport, SubmitResponse, WelcomeResponse};
use crate::upload::UploadedAsset;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Typed client for the video generation backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct JobApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl JobApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Every request made through this client gives up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("vision2video/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Where the finished video for `job_id` is served. Addressed purely by
    /// convention, no lookup involved.
    pub fn video_url(&self, job_id: &str) -> Result<String, ApiError> {
        let file = format!("{}.mp4", job_id);
        Ok(self.endpoint(&["outputs", &file])?.to_string())
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `POST /generate_video` with the image and prompt as multipart fields.
    /// Returns the job identifier assigned by the backend.
    pub async fn submit(&self, asset: &UploadedAsset, prompt: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["generate_video"])?;
        let image = Part::bytes(asset.bytes().to_vec())
            .file_name(asset.file_name().to_string())
            .mime_str(asset.mime())?;
        let form = Form::new()
            .part("image", image)
            .text("prompt", prompt.to_string());

        tracing::debug!(
            url = %url,
            file = %asset.file_name(),
            size = asset.size(),
            prompt_len = prompt.len(),
            "Submitting generation job"
        );

        let response = self.http.post(url).multipart(form).send().await?;
        let body: SubmitResponse = read_json(response).await?;
        if body.job_id.trim().is_empty() {
            return Err(ApiError::Decode("missing field `job_id`".to_string()));
        }
        Ok(body.job_id)
    }

    /// `GET /status/{job_id}`. Callers decide what a failure means via
    /// [`ApiError::is_transient`].
    pub async fn poll_once(&self, job_id: &str) -> Result<StatusReport, ApiError> {
        let url = self.endpoint(&["status", job_id])?;
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }

    /// `GET /`, used as a liveness probe.
    pub async fn welcome(&self) -> Result<String, ApiError> {
        let response = self.http.get(&self.base_url).send().await?;
        let body: WelcomeResponse = read_json(response).await?;
        Ok(body.message)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status { status, body });
    }

    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}
