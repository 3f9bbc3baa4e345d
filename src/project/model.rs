use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque identifier of a server-side dubbing job.
///
/// The backend may send it as a number or a string; it is always kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => JobId(s),
            Raw::Number(n) => JobId(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Pending,
        ProjectStatus::Processing,
        ProjectStatus::Completed,
        ProjectStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::Processing => "processing",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Failed => "failed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "Pending",
            ProjectStatus::Processing => "Processing",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Failed => "Failed",
        }
    }

    /// No further status updates are expected once a job reaches this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Failed)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The five fixed pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    SpeechRecognition,
    Translation,
    VoiceSynthesis,
    LipSync,
    Processing,
}

impl StepId {
    pub const ALL: [StepId; 5] = [
        StepId::SpeechRecognition,
        StepId::Translation,
        StepId::VoiceSynthesis,
        StepId::LipSync,
        StepId::Processing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::SpeechRecognition => "speech-recognition",
            StepId::Translation => "translation",
            StepId::VoiceSynthesis => "voice-synthesis",
            StepId::LipSync => "lip-sync",
            StepId::Processing => "processing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        StepId::ALL.into_iter().find(|step| step.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    #[default]
    Waiting,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StepState {
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default)]
    pub progress: f32,
}

pub type StepMap = BTreeMap<StepId, StepState>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: JobId,
    pub title: String,
    pub status: ProjectStatus,
    /// Overall progress, 0-100. Not tied to the step map in any way.
    pub progress: f32,
    pub steps: Option<StepMap>,
    pub error_message: Option<String>,
    pub result_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub size_bytes: Option<u64>,
}

impl Project {
    /// A freshly uploaded job that the server has not reported on yet.
    pub fn pending(id: JobId, title: impl Into<String>, size_bytes: Option<u64>) -> Self {
        Self {
            id,
            title: title.into(),
            status: ProjectStatus::Pending,
            progress: 0.0,
            steps: None,
            error_message: None,
            result_url: None,
            created_at: Utc::now(),
            size_bytes,
        }
    }

    /// Result media can be played or downloaded.
    pub fn is_playable(&self) -> bool {
        self.status == ProjectStatus::Completed && self.result_url.is_some()
    }
}

pub fn clamp_progress(progress: f32) -> f32 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 100.0)
    }
}
