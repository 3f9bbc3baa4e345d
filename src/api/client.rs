use super::types::{
    AuthResponse, ErrorBody, JobStatusResponse, JobSummary, LoginRequest, SignupRequest,
    UploadResponse,
};
use crate::config::AppConfig;
use crate::project::JobId;
use crate::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use std::path::Path;

/// Thin HTTP client for the dubbing backend.
#[derive(Clone)]
pub struct DubbingClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl DubbingClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            match HeaderValue::from_str(&format!("Token {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => tracing::warn!("Session token is not a valid header value, sending without it"),
            }
        }
        headers
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        tracing::debug!(username = %request.username, "Signing in");
        let response = self
            .http
            .post(self.url("/api/login/"))
            .json(request)
            .send()
            .await?;
        Self::parse_json(response).await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse> {
        tracing::debug!(username = %request.username, "Creating account");
        let response = self
            .http
            .post(self.url("/api/signup/"))
            .json(request)
            .send()
            .await?;
        Self::parse_json(response).await
    }

    /// Single multipart POST of the whole file; returns the job id.
    pub async fn upload_video(&self, file_path: &Path, mime: &str) -> Result<JobId> {
        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::validation("Invalid file", "File name is not valid UTF-8"))?
            .to_string();

        let file = tokio::fs::File::open(file_path).await?;
        let length = file.metadata().await?.len();

        let part = Part::stream_with_length(file, length)
            .file_name(file_name.clone())
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        tracing::info!(file = %file_name, bytes = length, "Uploading video");
        let response = self
            .http
            .post(self.url("/dubbing/upload/"))
            .headers(self.auth_headers())
            .multipart(form)
            .send()
            .await?;

        let upload: UploadResponse = Self::parse_json(response).await?;
        tracing::info!(file = %file_name, job_id = %upload.job_id, "Upload accepted");
        Ok(upload.job_id)
    }

    pub async fn job_status(&self, job_id: &JobId) -> Result<JobStatusResponse> {
        let response = self
            .http
            .get(self.url(&format!("/dubbing/job/{}/", job_id)))
            .headers(self.auth_headers())
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("job {}", job_id)));
        }
        Self::parse_json(response).await
    }

    pub async fn list_projects(&self) -> Result<Vec<JobSummary>> {
        let response = self
            .http
            .get(self.url("/dubbing/jobs/"))
            .headers(self.auth_headers())
            .send()
            .await?;
        Self::parse_json(response).await
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::message)
            .unwrap_or_else(|| "An error occurred.".to_string());
        tracing::warn!(status = status.as_u16(), %message, "Request rejected");
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }
}
