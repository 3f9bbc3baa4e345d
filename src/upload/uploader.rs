use super::types::{UploadEntry, UploadStatus};
use super::validation::{mime_for_path, validate_mime, validate_size};
use crate::api::DubbingClient;
use crate::project::JobId;
use crate::{Error, Result};
use std::path::Path;

/// Validates local video files and sends them to the upload endpoint.
#[derive(Clone)]
pub struct Uploader {
    client: DubbingClient,
    max_bytes: u64,
}

impl Uploader {
    pub fn new(client: DubbingClient, max_bytes: u64) -> Self {
        Self { client, max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Client-side checks only; nothing is sent.
    pub fn check_file(&self, file_path: &Path) -> Result<(u64, &'static str)> {
        let mime = validate_mime(mime_for_path(file_path))?;
        let metadata = std::fs::metadata(file_path)?;
        if !metadata.is_file() {
            return Err(Error::validation("Invalid file", "Please choose a single video file"));
        }
        validate_size(metadata.len(), self.max_bytes)?;
        Ok((metadata.len(), mime))
    }

    /// Upload an accepted entry and return the job id the server assigned.
    pub async fn upload(&self, entry: &UploadEntry) -> Result<JobId> {
        self.client.upload_video(&entry.path, entry.mime).await
    }
}

/// Files picked for upload and their state.
#[derive(Debug, Default)]
pub struct UploadQueue {
    entries: Vec<UploadEntry>,
    next_id: u64,
}

impl UploadQueue {
    pub fn entries(&self) -> &[UploadEntry] {
        &self.entries
    }

    pub fn get(&self, id: u64) -> Option<&UploadEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Validate `file_path` and, if accepted, add it as uploading.
    pub fn accept(&mut self, uploader: &Uploader, file_path: &Path) -> Result<UploadEntry> {
        let (size, mime) = uploader.check_file(file_path)?;
        self.next_id += 1;
        let entry = UploadEntry {
            id: self.next_id,
            name: file_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            path: file_path.to_path_buf(),
            size,
            mime,
            progress: 0.0,
            status: UploadStatus::Uploading,
        };
        tracing::debug!(file = %entry.name, size, mime, "Accepted file for upload");
        self.entries.push(entry.clone());
        Ok(entry)
    }

    pub fn complete(&mut self, id: u64, job_id: JobId) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.progress = 100.0;
            entry.status = UploadStatus::Completed(job_id);
        }
    }

    pub fn fail(&mut self, id: u64, message: impl Into<String>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.status = UploadStatus::Error(message.into());
        }
    }

    pub fn remove(&mut self, id: u64) -> Option<UploadEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn is_busy(&self) -> bool {
        self.entries.iter().any(UploadEntry::is_uploading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn uploader(base_url: String, max_bytes: u64) -> Uploader {
        let config = AppConfig {
            api_base_url: base_url,
            ..AppConfig::default()
        };
        Uploader::new(DubbingClient::new(&config).unwrap(), max_bytes)
    }

    fn write_file(dir: &Path, name: &str, bytes: usize) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&vec![0u8; bytes])
            .unwrap();
        path
    }

    #[test]
    fn rejects_non_video_and_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = uploader("http://localhost:8000".to_string(), 16);
        let mut queue = UploadQueue::default();

        let text = write_file(dir.path(), "script.txt", 4);
        let err = queue.accept(&uploader, &text).unwrap_err();
        assert_eq!(err.title(), "Invalid file type");

        let big = write_file(dir.path(), "movie.mp4", 17);
        let err = queue.accept(&uploader, &big).unwrap_err();
        assert_eq!(err.title(), "File too large");

        assert!(queue.entries().is_empty());
    }

    #[test]
    fn accepted_entries_track_status() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = uploader("http://localhost:8000".to_string(), 1024);
        let mut queue = UploadQueue::default();

        let first = queue
            .accept(&uploader, &write_file(dir.path(), "Dark Knight.mkv", 10))
            .unwrap();
        let second = queue
            .accept(&uploader, &write_file(dir.path(), "clip.mov", 10))
            .unwrap();
        assert_eq!(first.mime, "video/x-matroska");
        assert_eq!(first.title(), "Dark Knight");
        assert_eq!(second.badge(), "MOV");
        assert!(queue.is_busy());

        queue.complete(first.id, JobId::new("1"));
        queue.fail(second.id, "Upload failed");
        assert_eq!(queue.get(first.id).unwrap().progress, 100.0);
        assert_eq!(
            queue.get(second.id).unwrap().status,
            UploadStatus::Error("Upload failed".to_string())
        );
        assert!(!queue.is_busy());

        assert!(queue.remove(second.id).is_some());
        assert_eq!(queue.entries().len(), 1);
    }

    #[tokio::test]
    async fn rejected_file_never_reaches_the_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/dubbing/upload/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"job_id": 1})))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let uploader = uploader(server.uri(), 1024);
        let mut queue = UploadQueue::default();
        assert!(queue
            .accept(&uploader, &write_file(dir.path(), "cover.png", 10))
            .is_err());
    }

    #[tokio::test]
    async fn upload_returns_job_for_accepted_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/dubbing/upload/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"job_id": "j-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let uploader = uploader(server.uri(), 1024);
        let mut queue = UploadQueue::default();
        let entry = queue
            .accept(&uploader, &write_file(dir.path(), "movie.mp4", 32))
            .unwrap();

        assert_eq!(uploader.upload(&entry).await.unwrap(), JobId::new("j-1"));
    }
}
