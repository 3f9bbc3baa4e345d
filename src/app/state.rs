use crate::api::JobSummary;
use crate::auth::AuthMode;
use crate::poller::PollEvent;
use crate::project::JobId;
use crate::session::Session;
use crate::Error;
use std::time::{Duration, Instant};

/// Results of background work, delivered to the UI thread.
#[derive(Debug)]
pub enum AppEvent {
    AuthFinished {
        mode: AuthMode,
        result: Result<Session, Error>,
    },
    UploadFinished {
        entry_id: u64,
        result: Result<JobId, Error>,
    },
    Poll(PollEvent),
    ProjectsLoaded(Result<Vec<JobSummary>, Error>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardTab {
    #[default]
    Overview,
    Upload,
    Process,
    Projects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub kind: NoticeKind,
    created: Instant,
}

/// Transient toasts; each one disappears after `ttl`.
#[derive(Debug)]
pub struct Notifications {
    items: Vec<Notification>,
    ttl: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            ttl,
        }
    }

    pub fn info(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.push(title.into(), description.into(), NoticeKind::Info);
    }

    pub fn error(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.push(title.into(), description.into(), NoticeKind::Error);
    }

    pub fn report(&mut self, err: &Error) {
        self.error(err.title(), err.description());
    }

    fn push(&mut self, title: String, description: String, kind: NoticeKind) {
        match kind {
            NoticeKind::Info => tracing::info!(%title, %description, "Notification"),
            NoticeKind::Error => tracing::warn!(%title, %description, "Notification"),
        }
        self.items.push(Notification {
            title,
            description,
            kind,
            created: Instant::now(),
        });
    }

    /// Drop notifications older than the ttl.
    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items.retain(|n| now.duration_since(n.created) < ttl);
    }

    pub fn dismiss(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_expire_after_ttl() {
        let mut notes = Notifications::new(Duration::from_millis(50));
        notes.info("File removed", "");
        notes.error("Cannot play", "Project is not yet complete.");
        assert_eq!(notes.items().len(), 2);
        assert_eq!(notes.latest().unwrap().kind, NoticeKind::Error);

        notes.expire(Instant::now());
        assert_eq!(notes.items().len(), 2);

        notes.expire(Instant::now() + Duration::from_millis(60));
        assert!(notes.items().is_empty());
    }

    #[test]
    fn errors_become_error_notifications() {
        let mut notes = Notifications::default();
        notes.report(&Error::validation("Invalid file type", "Please upload a video"));
        let note = notes.latest().unwrap();
        assert_eq!(note.title, "Invalid file type");
        assert_eq!(note.description, "Please upload a video");
        assert_eq!(note.kind, NoticeKind::Error);

        notes.dismiss(0);
        assert!(notes.items().is_empty());
    }
}
