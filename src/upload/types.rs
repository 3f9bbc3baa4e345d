use crate::project::JobId;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    Uploading,
    Completed(JobId),
    Error(String),
}

/// One file in the upload list.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadEntry {
    pub id: u64,
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub mime: &'static str,
    pub progress: f32,
    pub status: UploadStatus,
}

impl UploadEntry {
    pub fn is_uploading(&self) -> bool {
        matches!(self.status, UploadStatus::Uploading)
    }

    /// Title for the project created from this upload: the file name
    /// without its extension.
    pub fn title(&self) -> String {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| self.name.clone())
    }

    /// Short badge shown next to the file name.
    pub fn badge(&self) -> &'static str {
        match self.mime {
            "video/mp4" => "MP4",
            "video/x-matroska" => "MKV",
            "video/avi" => "AVI",
            "video/quicktime" => "MOV",
            _ => "FILE",
        }
    }
}
