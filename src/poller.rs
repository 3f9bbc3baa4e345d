//! Fixed-interval job status polling.
//!
//! A poller asks for a job's status right away and then once per interval
//! until the job reaches a terminal status, is reported missing, or a request
//! fails. There is no retry and no backoff.

use crate::api::{DubbingClient, JobStatusResponse};
use crate::project::{JobId, ProjectStatus};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const CONNECTION_FAILURE: &str = "Failed to connect to the backend.";

#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatusResponse>;
}

#[async_trait]
impl JobStatusSource for DubbingClient {
    async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatusResponse> {
        self.job_status(job_id).await
    }
}

#[derive(Debug, Clone)]
pub enum PollEvent {
    Update {
        job_id: JobId,
        status: JobStatusResponse,
    },
    NotFound {
        job_id: JobId,
    },
    Failed {
        job_id: JobId,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Finished(ProjectStatus),
    NotFound,
    Failed,
}

/// Poll until a stop condition; every response is handed to `emit`.
pub async fn poll_job<S, F>(source: &S, job_id: &JobId, every: Duration, mut emit: F) -> PollOutcome
where
    S: JobStatusSource + ?Sized,
    F: FnMut(PollEvent),
{
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::debug!(%job_id, interval_ms = every.as_millis() as u64, "Polling job");

    loop {
        ticker.tick().await;
        match source.fetch_status(job_id).await {
            Ok(status) => {
                let current = status.status;
                emit(PollEvent::Update {
                    job_id: job_id.clone(),
                    status,
                });
                if current.is_terminal() {
                    tracing::info!(%job_id, status = %current, "Job reached terminal status");
                    return PollOutcome::Finished(current);
                }
            }
            Err(Error::NotFound(_)) => {
                tracing::warn!(%job_id, "Job not found, polling stopped");
                emit(PollEvent::NotFound {
                    job_id: job_id.clone(),
                });
                return PollOutcome::NotFound;
            }
            Err(e) => {
                tracing::error!(%job_id, error = %e, "Error fetching job status");
                emit(PollEvent::Failed {
                    job_id: job_id.clone(),
                    message: CONNECTION_FAILURE.to_string(),
                });
                return PollOutcome::Failed;
            }
        }
    }
}

/// At most one running poller per job.
pub struct PollerRegistry {
    runtime: Handle,
    interval: Duration,
    tasks: HashMap<JobId, JoinHandle<PollOutcome>>,
}

impl PollerRegistry {
    pub fn new(runtime: Handle, interval: Duration) -> Self {
        Self {
            runtime,
            interval,
            tasks: HashMap::new(),
        }
    }

    /// Start polling `job_id` unless a poller for it is still running.
    ///
    /// Returns whether a new poller was started.
    pub fn start<S, F>(&mut self, job_id: JobId, source: Arc<S>, emit: F) -> bool
    where
        S: JobStatusSource + ?Sized + 'static,
        F: FnMut(PollEvent) + Send + 'static,
    {
        self.prune();
        if self.tasks.contains_key(&job_id) {
            tracing::debug!(%job_id, "Poller already running");
            return false;
        }

        let interval = self.interval;
        let id = job_id.clone();
        let handle = self
            .runtime
            .spawn(async move { poll_job(source.as_ref(), &id, interval, emit).await });
        self.tasks.insert(job_id, handle);
        true
    }

    /// Abort the poller for `job_id`, if any.
    pub fn stop(&mut self, job_id: &JobId) -> bool {
        match self.tasks.remove(job_id) {
            Some(handle) => {
                handle.abort();
                tracing::debug!(%job_id, "Poller stopped");
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    pub fn is_polling(&self, job_id: &JobId) -> bool {
        self.tasks
            .get(job_id)
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    pub fn active_count(&self) -> usize {
        self.tasks.values().filter(|h| !h.is_finished()).count()
    }

    fn prune(&mut self) {
        self.tasks.retain(|_, handle| !handle.is_finished());
    }
}

impl Drop for PollerRegistry {
    fn drop(&mut self) {
        self.stop_all();
    }
}
