mod state;
mod ui;

use crate::api::DubbingClient;
use crate::auth::{AuthForm, AuthMode, AuthRequest};
use crate::config::AppConfig;
use crate::poller::{PollEvent, PollerRegistry};
use crate::project::{ActionRefusal, JobId, Project, ProjectStatus, ProjectStore, StatusFilter};
use crate::session::{Route, Session, SessionStore};
use crate::upload::{UploadQueue, Uploader};
use crate::Result;
use eframe::{egui, App};
pub use state::{AppEvent, DashboardTab, NoticeKind, Notification, Notifications};
use std::path::Path;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

const REPAINT_INTERVAL: Duration = Duration::from_millis(250);

pub struct DubbingApp {
    config: AppConfig,
    runtime: Arc<Runtime>,
    client: DubbingClient,
    uploader: Uploader,
    session: SessionStore,
    route: Route,
    tab: DashboardTab,
    auth_form: AuthForm,
    auth_in_flight: bool,
    uploads: UploadQueue,
    projects: ProjectStore,
    selected: Option<JobId>,
    filter: StatusFilter,
    search_query: String,
    pollers: PollerRegistry,
    notifications: Notifications,
    events_tx: std_mpsc::Sender<AppEvent>,
    events_rx: std_mpsc::Receiver<AppEvent>,
}

impl DubbingApp {
    pub fn new(config: AppConfig, runtime: Arc<Runtime>) -> Result<Self> {
        tracing::info!(api = %config.api_base_url, "Initializing Dub Studio");
        let session = SessionStore::open(&config.session_file);
        let client =
            DubbingClient::new(&config)?.with_token(session.token().map(str::to_string));
        let uploader = Uploader::new(client.clone(), config.max_upload_bytes);
        let pollers = PollerRegistry::new(runtime.handle().clone(), config.poll_interval);
        let (events_tx, events_rx) = std_mpsc::channel();

        let mut app = Self {
            config,
            runtime,
            client,
            uploader,
            session,
            route: Route::Landing,
            tab: DashboardTab::default(),
            auth_form: AuthForm::default(),
            auth_in_flight: false,
            uploads: UploadQueue::default(),
            projects: ProjectStore::new(),
            selected: None,
            filter: StatusFilter::All,
            search_query: String::new(),
            pollers,
            notifications: Notifications::default(),
            events_tx,
            events_rx,
        };

        if app.session.is_authenticated() {
            app.navigate(Route::Dashboard);
            app.refresh_projects();
        }
        Ok(app)
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    pub fn auth_form_mut(&mut self) -> &mut AuthForm {
        &mut self.auth_form
    }

    pub fn is_authenticating(&self) -> bool {
        self.auth_in_flight
    }

    /// Go to `requested`, or to sign in when it needs a session we don't have.
    pub fn navigate(&mut self, requested: Route) {
        let route = self.session.guard(requested);
        if route != requested {
            self.notifications
                .error("Sign in required", "Please sign in to continue");
        }
        self.route = route;
    }

    pub fn submit_auth(&mut self, mode: AuthMode) {
        if self.auth_in_flight {
            return;
        }
        let request = match self.auth_form.validate(mode) {
            Ok(request) => request,
            Err(e) => {
                self.notifications.report(&e);
                return;
            }
        };

        self.auth_in_flight = true;
        let user = self.auth_form.user_for(mode);
        let client = self.client.clone();
        let sender = self.events_tx.clone();

        self.runtime.spawn(async move {
            let response = match &request {
                AuthRequest::Login(login) => client.login(login).await,
                AuthRequest::Signup(signup) => client.signup(signup).await,
            };
            let result = response.map(|auth| Session {
                user,
                token: auth.token,
            });
            let _ = sender.send(AppEvent::AuthFinished { mode, result });
        });
    }

    pub fn logout(&mut self) {
        self.pollers.stop_all();
        self.reset_events();
        match self.session.logout() {
            Ok(next) => self.route = next,
            Err(e) => {
                tracing::error!(
                    path = %self.session.path().display(),
                    error = %e,
                    "Failed to remove session file"
                );
                self.notifications.report(&e);
                self.route = Route::SignIn;
            }
        }
        self.set_token(None);
        self.projects = ProjectStore::new();
        self.uploads = UploadQueue::default();
        self.selected = None;
        self.auth_form = AuthForm::default();
    }

    /// Swap in a fresh event channel so results of work started for an
    /// earlier session are dropped instead of applied.
    fn reset_events(&mut self) {
        let (events_tx, events_rx) = std_mpsc::channel();
        self.events_tx = events_tx;
        self.events_rx = events_rx;
    }

    fn set_token(&mut self, token: Option<String>) {
        self.client = self.client.clone().with_token(token);
        self.uploader = Uploader::new(self.client.clone(), self.config.max_upload_bytes);
    }

    /// Validate `file_path` and upload it in the background.
    pub fn start_upload(&mut self, file_path: &Path) {
        let entry = match self.uploads.accept(&self.uploader, file_path) {
            Ok(entry) => entry,
            Err(e) => {
                self.notifications.report(&e);
                return;
            }
        };

        let uploader = self.uploader.clone();
        let sender = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = uploader.upload(&entry).await;
            let _ = sender.send(AppEvent::UploadFinished {
                entry_id: entry.id,
                result,
            });
        });
    }

    pub fn remove_upload(&mut self, entry_id: u64) {
        if self.uploads.remove(entry_id).is_some() {
            self.notifications.info("File removed", "");
        }
    }

    pub fn refresh_projects(&mut self) {
        let client = self.client.clone();
        let sender = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = client.list_projects().await;
            let _ = sender.send(AppEvent::ProjectsLoaded(result));
        });
    }

    pub fn select_project(&mut self, job_id: JobId) {
        if self.projects.get(&job_id).is_some() {
            self.selected = Some(job_id);
            self.tab = DashboardTab::Process;
        }
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.selected.as_ref().and_then(|id| self.projects.get(id))
    }

    fn start_polling(&mut self, job_id: JobId) {
        let sender = self.events_tx.clone();
        self.pollers.start(job_id, Arc::new(self.client.clone()), move |event| {
            let _ = sender.send(AppEvent::Poll(event));
        });
    }

    /// Absolute URL of a finished project's result, or why there is none.
    pub fn result_url(&self, job_id: &JobId) -> std::result::Result<String, ActionRefusal> {
        let url = self.projects.playable_url(job_id)?;
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(url.to_string())
        } else {
            Ok(format!(
                "{}/{}",
                self.client.base_url(),
                url.trim_start_matches('/')
            ))
        }
    }

    /// Open the result in the system player or browser.
    pub fn open_result(&mut self, job_id: &JobId, verb: &str) {
        match self.result_url(job_id) {
            Ok(url) => {
                let title = self
                    .projects
                    .get(job_id)
                    .map(|p| p.title.clone())
                    .unwrap_or_default();
                if let Err(e) = open::that(&url) {
                    tracing::error!(%url, error = %e, "Failed to open result");
                    self.notifications.error("Error", format!("Could not open {}", url));
                } else {
                    self.notifications.info(format!("{} started", verb), title);
                }
            }
            Err(_) => self.notifications.error(
                format!("Cannot {}", verb.to_lowercase()),
                "Project is not yet complete.",
            ),
        }
    }

    /// Apply everything background tasks have reported. Returns whether
    /// anything changed.
    pub fn drain_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events_rx.try_recv() {
            changed = true;
            self.handle_event(event);
        }
        self.notifications.expire(Instant::now());
        changed
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::AuthFinished { mode, result } => {
                self.auth_in_flight = false;
                match result {
                    Ok(session) => self.finish_sign_in(mode, session),
                    Err(e) => {
                        tracing::warn!(error = %e, "Authentication failed");
                        self.notifications.error("Error", e.description());
                    }
                }
            }
            AppEvent::UploadFinished { entry_id, result } => match result {
                Ok(job_id) => {
                    let Some(entry) = self.uploads.get(entry_id).cloned() else {
                        tracing::debug!(entry_id, "Upload finished for removed entry");
                        return;
                    };
                    self.uploads.complete(entry_id, job_id.clone());
                    self.projects
                        .upsert(Project::pending(job_id.clone(), entry.title(), Some(entry.size)));
                    self.notifications.info(
                        "File uploaded successfully",
                        format!("{} is ready for processing.", entry.name),
                    );
                    self.selected = Some(job_id.clone());
                    self.start_polling(job_id);
                }
                Err(e) => {
                    tracing::error!(entry_id, error = %e, "Upload failed");
                    self.uploads.fail(entry_id, e.description());
                    self.notifications.error("Upload failed", e.description());
                }
            },
            AppEvent::Poll(poll) => self.handle_poll(poll),
            AppEvent::ProjectsLoaded(Ok(jobs)) => {
                tracing::info!(count = jobs.len(), "Loaded projects");
                self.projects.replace_from_server(jobs);
                for job_id in self.projects.active_ids() {
                    self.start_polling(job_id);
                }
            }
            AppEvent::ProjectsLoaded(Err(e)) => {
                tracing::warn!(error = %e, "Could not load projects");
                self.notifications.report(&e);
            }
        }
    }

    fn finish_sign_in(&mut self, mode: AuthMode, session: Session) {
        let token = session.token.clone();
        if let Err(e) = self.session.sign_in(session) {
            tracing::error!(error = %e, "Failed to persist session");
            self.notifications.report(&e);
            return;
        }
        self.reset_events();
        self.set_token(Some(token));
        self.auth_form.clear_password();
        let title = match mode {
            AuthMode::SignIn => "Signed In!",
            AuthMode::SignUp => "Account Created!",
        };
        self.notifications.info(title, "Welcome to Tamil Dub Cinema");
        self.navigate(Route::Dashboard);
        self.refresh_projects();
    }

    fn handle_poll(&mut self, event: PollEvent) {
        match event {
            PollEvent::Update { job_id, status } => {
                let previous = self.projects.get(&job_id).map(|p| p.status);
                let Some(project) = self.projects.apply_status(&job_id, &status) else {
                    return;
                };
                if previous == Some(project.status) {
                    return;
                }
                match project.status {
                    ProjectStatus::Failed => self.notifications.error(
                        "Processing Failed",
                        project
                            .error_message
                            .clone()
                            .unwrap_or_else(|| "There was an error in the dubbing process".to_string()),
                    ),
                    ProjectStatus::Completed => self
                        .notifications
                        .info("Dubbing complete", format!("{} is ready.", project.title)),
                    _ => {}
                }
            }
            PollEvent::NotFound { job_id } => {
                tracing::warn!(%job_id, "Polled job does not exist");
                self.pollers.stop(&job_id);
                self.notifications
                    .error("Job not found", "The requested dubbing job does not exist.");
            }
            PollEvent::Failed { job_id, message } => {
                self.projects.mark_failed(&job_id, message.clone());
                self.notifications.error("Error", message);
            }
        }
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        if self.drain_events() {
            ctx.request_repaint();
        }
        if self.auth_in_flight || self.uploads.is_busy() || self.pollers.active_count() > 0 {
            ctx.request_repaint_after(REPAINT_INTERVAL);
        }
        if !self.notifications.items().is_empty() {
            ctx.request_repaint_after(Duration::from_secs(1));
        }
    }
}

impl App for DubbingApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::JobStatusResponse;
    use crate::session::User;
    use wiremock::matchers::{any, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(dir: &Path, api_base_url: &str) -> AppConfig {
        AppConfig {
            api_base_url: api_base_url.to_string(),
            session_file: dir.join("session.json"),
            ..AppConfig::default()
        }
    }

    fn runtime() -> Arc<Runtime> {
        Arc::new(Runtime::new().unwrap())
    }

    fn signed_in_store(path: &Path) {
        let mut store = SessionStore::open(path);
        store
            .sign_in(Session {
                user: User {
                    name: "alex".to_string(),
                    email: "alex@example.com".to_string(),
                    avatar: None,
                },
                token: "tok".to_string(),
            })
            .unwrap();
    }

    fn status(json: serde_json::Value) -> JobStatusResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn signup_with_missing_field_never_calls_the_server() {
        let server_rt = Runtime::new().unwrap();
        let server = server_rt.block_on(MockServer::start());
        server_rt.block_on(
            Mock::given(any())
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&server),
        );

        let dir = tempfile::tempdir().unwrap();
        let mut app = DubbingApp::new(test_config(dir.path(), &server.uri()), runtime()).unwrap();
        app.navigate(Route::SignUp);
        let form = app.auth_form_mut();
        form.email = "alex@example.com".to_string();
        form.password = "pw".to_string();

        app.submit_auth(AuthMode::SignUp);

        assert!(!app.is_authenticating());
        let note = app.notifications().latest().unwrap();
        assert_eq!(note.kind, NoticeKind::Error);
        assert_eq!(note.title, "Please fill in all required fields");
        assert_eq!(note.description, "Name is required");
        assert_eq!(app.route(), Route::SignUp);

        std::thread::sleep(Duration::from_millis(50));
        server_rt.block_on(server.verify());
    }

    #[test]
    fn protected_routes_redirect_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut app =
            DubbingApp::new(test_config(dir.path(), "http://127.0.0.1:9"), runtime()).unwrap();
        assert_eq!(app.route(), Route::Landing);

        app.navigate(Route::Upload);
        assert_eq!(app.route(), Route::SignIn);
        app.navigate(Route::SignUp);
        assert_eq!(app.route(), Route::SignUp);
    }

    fn jobs(json: serde_json::Value) -> Vec<crate::api::JobSummary> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn logout_clears_session_and_leaves_protected_view() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), "http://127.0.0.1:9");
        signed_in_store(&config.session_file);

        let mut app = DubbingApp::new(config.clone(), runtime()).unwrap();
        assert_eq!(app.route(), Route::Dashboard);

        app.projects
            .upsert(Project::pending(JobId::new("3"), "Heat", None));
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"frames").unwrap();
        app.uploads.accept(&app.uploader, &video).unwrap();

        app.logout();
        assert_eq!(app.route(), Route::SignIn);
        assert!(!config.session_file.exists());
        assert!(app.projects().is_empty());
        assert!(app.uploads.entries().is_empty());

        app.navigate(Route::Dashboard);
        assert_eq!(app.route(), Route::SignIn);
    }

    #[test]
    fn rejected_upload_shows_validation_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut app =
            DubbingApp::new(test_config(dir.path(), "http://127.0.0.1:9"), runtime()).unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, b"hello").unwrap();

        app.start_upload(&notes);

        assert_eq!(app.notifications().latest().unwrap().title, "Invalid file type");
        assert!(app.uploads.entries().is_empty());
    }

    #[test]
    fn poll_events_reconcile_into_projects() {
        let dir = tempfile::tempdir().unwrap();
        let mut app =
            DubbingApp::new(test_config(dir.path(), "http://127.0.0.1:9"), runtime()).unwrap();
        let job = JobId::new("12");
        app.projects
            .upsert(Project::pending(job.clone(), "Inception", Some(1024)));

        app.handle_event(AppEvent::Poll(PollEvent::Update {
            job_id: job.clone(),
            status: status(serde_json::json!({"status": "processing", "progress": 30})),
        }));
        assert_eq!(app.projects().get(&job).unwrap().progress, 30.0);

        app.handle_event(AppEvent::Poll(PollEvent::Update {
            job_id: job.clone(),
            status: status(serde_json::json!({
                "status": "failed",
                "progress": 30,
                "error_message": "Voice synthesis crashed"
            })),
        }));
        let note = app.notifications().latest().unwrap();
        assert_eq!(note.title, "Processing Failed");
        assert_eq!(note.description, "Voice synthesis crashed");

        app.handle_event(AppEvent::Poll(PollEvent::Failed {
            job_id: job.clone(),
            message: crate::poller::CONNECTION_FAILURE.to_string(),
        }));
        let project = app.projects().get(&job).unwrap();
        assert_eq!(project.status, ProjectStatus::Failed);
        assert_eq!(
            project.error_message.as_deref(),
            Some(crate::poller::CONNECTION_FAILURE)
        );
    }

    #[test]
    fn logout_discards_results_of_earlier_session() {
        let server_rt = Runtime::new().unwrap();
        let server = server_rt.block_on(MockServer::start());
        server_rt.block_on(
            Mock::given(method("GET"))
                .and(path("/dubbing/jobs/"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!([
                            {"id": 7, "title": "Old", "status": "processing", "progress": 10}
                        ]))
                        .set_delay(Duration::from_millis(200)),
                )
                .mount(&server),
        );

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), &server.uri());
        signed_in_store(&config.session_file);
        let mut app = DubbingApp::new(config, runtime()).unwrap();
        let stale = app.events_tx.clone();

        app.logout();
        std::thread::sleep(Duration::from_millis(400));
        app.drain_events();

        assert!(app.projects().is_empty());
        assert_eq!(app.pollers.active_count(), 0);
        assert!(stale
            .send(AppEvent::UploadFinished {
                entry_id: 0,
                result: Ok(JobId::new("7")),
            })
            .is_err());
    }

    #[test]
    fn projects_loaded_polls_only_unfinished_jobs() {
        let server_rt = Runtime::new().unwrap();
        let server = server_rt.block_on(MockServer::start());
        server_rt.block_on(
            Mock::given(method("GET"))
                .and(path_regex("^/dubbing/job/"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!({"status": "processing", "progress": 5}))
                        .set_delay(Duration::from_secs(5)),
                )
                .mount(&server),
        );

        let dir = tempfile::tempdir().unwrap();
        let mut app = DubbingApp::new(test_config(dir.path(), &server.uri()), runtime()).unwrap();
        let listed = serde_json::json!([
            {"id": 1, "title": "Running", "status": "processing", "progress": 40},
            {"id": 2, "title": "Done", "status": "completed", "progress": 100},
            {"id": 3, "title": "Queued", "status": "pending", "progress": 0}
        ]);

        app.handle_event(AppEvent::ProjectsLoaded(Ok(jobs(listed.clone()))));
        assert!(app.pollers.is_polling(&JobId::new("1")));
        assert!(!app.pollers.is_polling(&JobId::new("2")));
        assert!(app.pollers.is_polling(&JobId::new("3")));
        assert_eq!(app.pollers.active_count(), 2);

        app.handle_event(AppEvent::ProjectsLoaded(Ok(jobs(listed))));
        assert_eq!(app.pollers.active_count(), 2);
        assert_eq!(app.projects().len(), 3);
    }

    #[test]
    fn refresh_keeps_project_uploaded_meanwhile() {
        let dir = tempfile::tempdir().unwrap();
        let mut app =
            DubbingApp::new(test_config(dir.path(), "http://127.0.0.1:9"), runtime()).unwrap();
        let job = JobId::new("12");
        app.projects
            .upsert(Project::pending(job.clone(), "Inception", Some(1024)));
        app.select_project(job.clone());

        app.handle_event(AppEvent::ProjectsLoaded(Ok(Vec::new())));
        app.handle_event(AppEvent::Poll(PollEvent::Update {
            job_id: job.clone(),
            status: status(serde_json::json!({"status": "processing", "progress": 40})),
        }));

        let selected = app.selected_project().unwrap();
        assert_eq!(selected.id, job);
        assert_eq!(selected.progress, 40.0);
    }

    #[test]
    fn missing_job_is_reported_and_its_poller_dropped() {
        let server_rt = Runtime::new().unwrap();
        let server = server_rt.block_on(MockServer::start());
        server_rt.block_on(
            Mock::given(any())
                .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_secs(5)))
                .mount(&server),
        );

        let dir = tempfile::tempdir().unwrap();
        let mut app = DubbingApp::new(test_config(dir.path(), &server.uri()), runtime()).unwrap();
        let job = JobId::new("404");
        app.start_polling(job.clone());
        assert!(app.pollers.is_polling(&job));

        app.handle_event(AppEvent::Poll(PollEvent::NotFound { job_id: job.clone() }));

        assert!(!app.pollers.is_polling(&job));

        let note = app.notifications().latest().unwrap();
        assert_eq!(note.kind, NoticeKind::Error);
        assert_eq!(note.title, "Job not found");
        assert_eq!(note.description, "The requested dubbing job does not exist.");
    }

    #[test]
    fn unfinished_project_cannot_be_played() {
        let dir = tempfile::tempdir().unwrap();
        let mut app =
            DubbingApp::new(test_config(dir.path(), "http://127.0.0.1:9"), runtime()).unwrap();
        let job = JobId::new("4");
        app.projects.upsert(Project::pending(job.clone(), "Interstellar", None));

        app.open_result(&job, "Play");
        let note = app.notifications().latest().unwrap();
        assert_eq!(note.title, "Cannot play");
        assert_eq!(note.description, "Project is not yet complete.");
    }

    #[test]
    fn relative_result_urls_resolve_against_api() {
        let dir = tempfile::tempdir().unwrap();
        let mut app =
            DubbingApp::new(test_config(dir.path(), "http://127.0.0.1:9"), runtime()).unwrap();
        let job = JobId::new("5");
        app.projects.upsert(Project::pending(job.clone(), "Heat", None));
        app.projects.apply_status(
            &job,
            &status(serde_json::json!({
                "status": "completed",
                "progress": 100,
                "result_url": "/media/results/5.mp4"
            })),
        );

        assert_eq!(
            app.result_url(&job).unwrap(),
            "http://127.0.0.1:9/media/results/5.mp4"
        );
    }
}
