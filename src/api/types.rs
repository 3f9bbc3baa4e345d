use crate::project::{JobId, ProjectStatus, StepId, StepMap, StepState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

/// Body of a failed request, when the server bothers to send one.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn message(self) -> Option<String> {
        self.error.or(self.detail)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(alias = "id")]
    pub job_id: JobId,
}

/// Status blob returned for a single job.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    pub status: ProjectStatus,
    #[serde(default)]
    pub progress: f32,
    #[serde(default, alias = "stepStatus")]
    pub step_status: Option<HashMap<String, StepState>>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default, alias = "result_file")]
    pub result_url: Option<String>,
}

impl JobStatusResponse {
    /// Step map keyed by known step ids; unknown keys are dropped.
    pub fn steps(&self) -> Option<StepMap> {
        self.step_status.as_ref().map(|raw| {
            raw.iter()
                .filter_map(|(key, state)| match StepId::parse(key) {
                    Some(step) => Some((step, *state)),
                    None => {
                        tracing::debug!(step = %key, "Ignoring unknown pipeline step");
                        None
                    }
                })
                .collect()
        })
    }
}

/// One entry of the project list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub status: JobStatusResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::StepStatus;

    #[test]
    fn decodes_status_with_step_map() {
        let body = r#"{
            "status": "processing",
            "progress": 40,
            "step_status": {
                "speech-recognition": {"status": "completed", "progress": 100},
                "translation": {"status": "in-progress", "progress": 55},
                "karaoke": {"status": "waiting", "progress": 0}
            }
        }"#;
        let response: JobStatusResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, ProjectStatus::Processing);
        assert_eq!(response.progress, 40.0);

        let steps = response.steps().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[&StepId::Translation].status, StepStatus::InProgress);
        assert_eq!(steps[&StepId::Translation].progress, 55.0);
    }

    #[test]
    fn decodes_minimal_failed_status() {
        let body = r#"{"status": "failed", "error_message": "lip sync crashed"}"#;
        let response: JobStatusResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, ProjectStatus::Failed);
        assert_eq!(response.progress, 0.0);
        assert!(response.steps().is_none());
        assert_eq!(response.error_message.as_deref(), Some("lip sync crashed"));
    }

    #[test]
    fn upload_response_accepts_id_alias() {
        let response: UploadResponse = serde_json::from_str(r#"{"id": 17}"#).unwrap();
        assert_eq!(response.job_id, JobId::new("17"));
    }

    #[test]
    fn job_summary_flattens_status_fields() {
        let body = r#"{
            "id": 3,
            "title": "Inception",
            "created_at": "2023-05-10T10:00:00Z",
            "status": "completed",
            "progress": 100,
            "result_url": "/media/results/3.mp4"
        }"#;
        let summary: JobSummary = serde_json::from_str(body).unwrap();
        assert_eq!(summary.id, JobId::new("3"));
        assert_eq!(summary.title.as_deref(), Some("Inception"));
        assert_eq!(summary.status.status, ProjectStatus::Completed);
        assert_eq!(summary.status.result_url.as_deref(), Some("/media/results/3.mp4"));
    }
}
