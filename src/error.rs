//! Error types shared by the client library.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before any request was made
    #[error("{title}: {description}")]
    Validation { title: String, description: String },

    /// Request could not be sent or the response body could not be read
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn validation(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Validation {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Short heading used when the error is shown as a notification.
    pub fn title(&self) -> &str {
        match self {
            Error::Validation { title, .. } => title,
            Error::NotFound(_) => "Not found",
            Error::Transport(_) | Error::Api { .. } => "Error",
            Error::Io(_) | Error::Json(_) => "Error",
            Error::Config(_) => "Configuration error",
        }
    }

    /// User-facing text for the notification body.
    pub fn description(&self) -> String {
        match self {
            Error::Validation { description, .. } => description.clone(),
            Error::Api { message, .. } => message.clone(),
            Error::Transport(_) => "An error occurred.".to_string(),
            other => other.to_string(),
        }
    }
}
