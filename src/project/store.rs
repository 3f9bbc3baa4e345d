use super::model::{clamp_progress, JobId, Project, ProjectStatus};
use crate::api::{JobStatusResponse, JobSummary};
use chrono::Utc;

/// Status filter used by the project list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ProjectStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: ProjectStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectCounts {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl ProjectCounts {
    /// Pending and processing jobs together.
    pub fn in_progress(&self) -> usize {
        self.pending + self.processing
    }
}

/// Why a project action was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRefusal {
    UnknownProject,
    NotComplete,
}

/// In-memory list of projects, one per uploaded video.
#[derive(Debug, Default, Clone)]
pub struct ProjectStore {
    projects: Vec<Project>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, id: &JobId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    /// Insert a project, replacing an existing one with the same id.
    pub fn upsert(&mut self, project: Project) {
        match self.projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project,
            None => self.projects.push(project),
        }
    }

    /// Overwrite a project's status fields with a polled response.
    ///
    /// Last write wins: nothing from the previous state is kept, and the step
    /// map is not checked against the overall progress.
    pub fn apply_status(&mut self, id: &JobId, response: &JobStatusResponse) -> Option<&Project> {
        let project = self.projects.iter_mut().find(|p| &p.id == id)?;
        project.status = response.status;
        project.progress = clamp_progress(response.progress);
        project.steps = response.steps();
        project.error_message = response.error_message.clone();
        project.result_url = response.result_url.clone();
        tracing::debug!(
            job_id = %id,
            status = %project.status,
            progress = project.progress,
            "Applied job status"
        );
        Some(&*project)
    }

    pub fn mark_failed(&mut self, id: &JobId, message: impl Into<String>) -> Option<&Project> {
        let project = self.projects.iter_mut().find(|p| &p.id == id)?;
        project.status = ProjectStatus::Failed;
        project.error_message = Some(message.into());
        Some(&*project)
    }

    /// Replace the store contents with the server's project list.
    ///
    /// Local fields the list endpoint does not carry (upload size) are kept.
    /// Unfinished local projects missing from the list stay: the list may have
    /// been requested before their upload finished.
    pub fn replace_from_server(&mut self, jobs: Vec<JobSummary>) {
        let previous = std::mem::take(&mut self.projects);
        let mut projects: Vec<Project> = jobs
            .into_iter()
            .map(|job| {
                let local = previous.iter().find(|p| p.id == job.id);
                Project {
                    title: job
                        .title
                        .clone()
                        .or_else(|| local.map(|p| p.title.clone()))
                        .unwrap_or_else(|| format!("Job {}", job.id)),
                    status: job.status.status,
                    progress: clamp_progress(job.status.progress),
                    steps: job.status.steps(),
                    error_message: job.status.error_message.clone(),
                    result_url: job.status.result_url.clone(),
                    created_at: job
                        .created_at
                        .or_else(|| local.map(|p| p.created_at))
                        .unwrap_or_else(Utc::now),
                    size_bytes: local.and_then(|p| p.size_bytes),
                    id: job.id,
                }
            })
            .collect();

        for project in previous {
            if !project.status.is_terminal() && !projects.iter().any(|p| p.id == project.id) {
                tracing::debug!(job_id = %project.id, "Keeping unlisted in-flight project");
                projects.push(project);
            }
        }
        self.projects = projects;
    }

    /// Newest first.
    pub fn recent(&self) -> Vec<&Project> {
        let mut sorted: Vec<&Project> = self.projects.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted
    }

    pub fn filter(&self, filter: StatusFilter) -> Vec<&Project> {
        self.search(filter, "")
    }

    /// Projects matching the status filter whose title contains `query`
    /// (case-insensitive), newest first.
    pub fn search(&self, filter: StatusFilter, query: &str) -> Vec<&Project> {
        let needle = query.trim().to_lowercase();
        self.recent()
            .into_iter()
            .filter(|p| filter.matches(p.status))
            .filter(|p| needle.is_empty() || p.title.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn counts(&self) -> ProjectCounts {
        self.projects
            .iter()
            .fold(ProjectCounts::default(), |mut counts, project| {
                counts.total += 1;
                match project.status {
                    ProjectStatus::Pending => counts.pending += 1,
                    ProjectStatus::Processing => counts.processing += 1,
                    ProjectStatus::Completed => counts.completed += 1,
                    ProjectStatus::Failed => counts.failed += 1,
                }
                counts
            })
    }

    /// Jobs that still need a poller.
    pub fn active_ids(&self) -> Vec<JobId> {
        self.projects
            .iter()
            .filter(|p| !p.status.is_terminal())
            .map(|p| p.id.clone())
            .collect()
    }

    /// Result URL of a project that can be played or downloaded.
    pub fn playable_url(&self, id: &JobId) -> Result<&str, ActionRefusal> {
        let project = self.get(id).ok_or(ActionRefusal::UnknownProject)?;
        match (&project.status, &project.result_url) {
            (ProjectStatus::Completed, Some(url)) => Ok(url.as_str()),
            _ => Err(ActionRefusal::NotComplete),
        }
    }
}
