use super::{DashboardTab, DubbingApp, NoticeKind};
use crate::auth::AuthMode;
use crate::pipeline::{ProcessView, STEPS};
use crate::project::format::{format_percent, FileSizeUtils};
use crate::project::{JobId, ProjectStatus, StatusFilter, StepStatus};
use crate::session::Route;
use crate::upload::UploadStatus;
use eframe::egui::{self, Align, Color32, RichText};
use rfd::FileDialog;

const ACCENT: Color32 = Color32::from_rgb(98, 70, 234);
const ERROR: Color32 = Color32::from_rgb(220, 50, 50);
const SUCCESS: Color32 = Color32::from_rgb(0, 160, 80);
const MUTED: Color32 = Color32::from_rgb(150, 150, 150);

fn status_color(status: ProjectStatus) -> Color32 {
    match status {
        ProjectStatus::Pending => MUTED,
        ProjectStatus::Processing => Color32::from_rgb(155, 135, 245),
        ProjectStatus::Completed => SUCCESS,
        ProjectStatus::Failed => ERROR,
    }
}

impl DubbingApp {
    pub fn render(&mut self, ctx: &egui::Context) {
        self.render_header(ctx);
        self.render_notifications(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(12.0);
                match self.route {
                    Route::Landing => self.render_landing(ui),
                    Route::SignIn => self.render_auth(ui, AuthMode::SignIn),
                    Route::SignUp => self.render_auth(ui, AuthMode::SignUp),
                    Route::Dashboard => self.render_dashboard(ui),
                    Route::Upload => self.render_upload(ui),
                    Route::Profile => self.render_profile(ui),
                }
            });
        });
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        let mut next_route = None;
        let mut logout = false;

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(RichText::new("Tamil Dub Cinema").color(ACCENT));
                ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                    match self.session.user() {
                        Some(user) => {
                            if ui.button("Logout").clicked() {
                                logout = true;
                            }
                            if ui.button("Profile").clicked() {
                                next_route = Some(Route::Profile);
                            }
                            if ui.button("Upload").clicked() {
                                next_route = Some(Route::Upload);
                            }
                            if ui.button("Dashboard").clicked() {
                                next_route = Some(Route::Dashboard);
                            }
                            ui.label(format!("Hi, {}", user.name));
                        }
                        None => {
                            if ui.button("Sign Up").clicked() {
                                next_route = Some(Route::SignUp);
                            }
                            if ui.button("Sign In").clicked() {
                                next_route = Some(Route::SignIn);
                            }
                        }
                    }
                });
            });
        });

        if logout {
            self.logout();
        } else if let Some(route) = next_route {
            self.navigate(route);
        }
    }

    fn render_notifications(&mut self, ctx: &egui::Context) {
        if self.notifications.items().is_empty() {
            return;
        }
        let mut dismissed = None;

        egui::TopBottomPanel::bottom("notifications").show(ctx, |ui| {
            ui.add_space(4.0);
            for (index, note) in self.notifications.items().iter().enumerate() {
                let color = match note.kind {
                    NoticeKind::Info => ACCENT,
                    NoticeKind::Error => ERROR,
                };
                ui.horizontal(|ui| {
                    ui.colored_label(color, RichText::new(note.title.as_str()).strong());
                    if !note.description.is_empty() {
                        ui.label(note.description.as_str());
                    }
                    if ui.small_button("✕").clicked() {
                        dismissed = Some(index);
                    }
                });
            }
            ui.add_space(4.0);
        });

        if let Some(index) = dismissed {
            self.notifications.dismiss(index);
        }
    }

    fn render_landing(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.heading("English movies, dubbed into Tamil");
            ui.add_space(5.0);
            ui.label(
                RichText::new("Upload a movie and follow every step of the dubbing pipeline")
                    .color(ui.visuals().text_color().gamma_multiply(0.7)),
            );
        });
        ui.add_space(20.0);

        ui.group(|ui| {
            ui.label(RichText::new("How it works").strong());
            ui.add_space(6.0);
            for (index, step) in STEPS.iter().enumerate() {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(format!("{}.", index + 1)).color(ACCENT));
                    ui.label(RichText::new(step.name).strong());
                    ui.label(step.description);
                });
            }
        });

        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            if ui
                .add(egui::Button::new("Get Started").min_size(egui::vec2(200.0, 40.0)))
                .clicked()
            {
                self.navigate(Route::Dashboard);
            }
        });
    }

    fn render_auth(&mut self, ui: &mut egui::Ui, mode: AuthMode) {
        let (title, action, switch_label, switch_route) = match mode {
            AuthMode::SignIn => ("Sign In", "Sign In", "Don't have an account? Sign up", Route::SignUp),
            AuthMode::SignUp => ("Create Account", "Sign Up", "Already have an account? Sign in", Route::SignIn),
        };
        let busy = self.auth_in_flight;
        let mut submit = false;
        let mut switch = false;

        ui.vertical_centered(|ui| {
            ui.set_max_width(360.0);
            ui.heading(title);
            ui.add_space(12.0);

            egui::Grid::new("auth_form")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    if mode == AuthMode::SignUp {
                        ui.label("Name");
                        ui.text_edit_singleline(&mut self.auth_form.name);
                        ui.end_row();
                    }
                    ui.label("Email");
                    ui.text_edit_singleline(&mut self.auth_form.email);
                    ui.end_row();

                    ui.label("Password");
                    let response =
                        ui.add(egui::TextEdit::singleline(&mut self.auth_form.password).password(true));
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        submit = true;
                    }
                    ui.end_row();
                });

            ui.add_space(12.0);
            ui.add_enabled_ui(!busy, |ui| {
                let label = if busy { "Please wait..." } else { action };
                if ui
                    .add(egui::Button::new(label).min_size(egui::vec2(200.0, 36.0)))
                    .clicked()
                {
                    submit = true;
                }
            });
            ui.add_space(8.0);
            if ui.link(switch_label).clicked() {
                switch = true;
            }
        });

        if submit {
            self.submit_auth(mode);
        }
        if switch {
            self.navigate(switch_route);
        }
    }

    fn render_dashboard(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.tab, DashboardTab::Overview, "Overview");
            ui.selectable_value(&mut self.tab, DashboardTab::Upload, "Upload");
            ui.selectable_value(&mut self.tab, DashboardTab::Process, "Process");
            ui.selectable_value(&mut self.tab, DashboardTab::Projects, "Projects");
        });
        ui.separator();
        ui.add_space(8.0);

        match self.tab {
            DashboardTab::Overview => self.render_overview(ui),
            DashboardTab::Upload => self.render_upload(ui),
            DashboardTab::Process => self.render_process(ui),
            DashboardTab::Projects => self.render_projects(ui),
        }
    }

    fn render_overview(&mut self, ui: &mut egui::Ui) {
        let counts = self.projects.counts();
        ui.horizontal(|ui| {
            for (title, value) in [
                ("Total Projects", counts.total),
                ("In Progress", counts.in_progress()),
                ("Completed", counts.completed),
                ("Failed", counts.failed),
            ] {
                ui.group(|ui| {
                    ui.set_min_width(140.0);
                    ui.vertical(|ui| {
                        ui.label(RichText::new(title).color(MUTED));
                        ui.label(RichText::new(value.to_string()).size(28.0).strong());
                    });
                });
            }
        });

        ui.add_space(16.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new("Recent Projects").strong());
            if ui.small_button("View All").clicked() {
                self.tab = DashboardTab::Projects;
            }
        });
        ui.add_space(6.0);

        let mut open = None;
        let recent: Vec<_> = self.projects.recent().into_iter().take(4).cloned().collect();
        if recent.is_empty() {
            ui.label(RichText::new("No projects yet. Upload a movie to get started.").color(MUTED));
        }
        for project in recent {
            ui.horizontal(|ui| {
                if ui.link(project.title.as_str()).clicked() {
                    open = Some(project.id.clone());
                }
                ui.colored_label(status_color(project.status), project.status.label());
                ui.add(
                    egui::ProgressBar::new(project.progress / 100.0)
                        .desired_width(200.0)
                        .text(format_percent(project.progress)),
                );
                ui.label(RichText::new(project.created_at.format("%Y-%m-%d").to_string()).color(MUTED));
            });
        }
        if let Some(id) = open {
            self.select_project(id);
        }
    }

    fn render_upload(&mut self, ui: &mut egui::Ui) {
        let mut picked = None;
        let mut removed = None;

        ui.vertical_centered(|ui| {
            ui.heading("UPLOAD FILES");
        });
        ui.add_space(10.0);

        ui.group(|ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(10.0);
                if ui
                    .add(egui::Button::new("📁 Browse Files").min_size(egui::vec2(200.0, 40.0)))
                    .clicked()
                {
                    picked = FileDialog::new()
                        .add_filter("Video", &["mp4", "mkv", "avi", "mov", "qt"])
                        .pick_file();
                }
                ui.add_space(6.0);
                ui.label(
                    RichText::new(format!(
                        "Supports: MP4, MKV, AVI, MOV (Max {})",
                        FileSizeUtils::format_size(self.uploader.max_bytes())
                    ))
                    .color(MUTED),
                );
                ui.add_space(10.0);
            });
        });

        if !self.uploads.entries().is_empty() {
            ui.add_space(12.0);
            ui.label(RichText::new("Uploaded files").strong());
            for entry in self.uploads.entries() {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(entry.badge()).color(ACCENT).monospace());
                    ui.label(entry.name.as_str());
                    ui.label(RichText::new(FileSizeUtils::format_size(entry.size)).color(MUTED));
                    match &entry.status {
                        UploadStatus::Uploading => {
                            ui.add(egui::Spinner::new());
                            ui.label("Uploading...");
                        }
                        UploadStatus::Completed(job_id) => {
                            ui.colored_label(SUCCESS, format!("✅ Complete (job {})", job_id));
                        }
                        UploadStatus::Error(message) => {
                            ui.colored_label(ERROR, format!("❌ {}", message));
                        }
                    }
                    if !entry.is_uploading() && ui.small_button("✕").clicked() {
                        removed = Some(entry.id);
                    }
                });
            }
        }

        if let Some(path) = picked {
            self.start_upload(&path);
        }
        if let Some(id) = removed {
            self.remove_upload(id);
        }
    }

    fn render_process(&mut self, ui: &mut egui::Ui) {
        let Some(project) = self.selected_project().cloned() else {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label(RichText::new("No Project Processing").size(18.0).strong());
                ui.label(RichText::new("Upload a file to start dubbing").color(MUTED));
            });
            return;
        };
        let view = ProcessView::for_project(&project);

        ui.horizontal(|ui| {
            ui.heading(project.title.as_str());
            let badge = if view.playing { "Processing" } else { "Paused" };
            ui.colored_label(status_color(project.status), badge);
        });
        ui.label(RichText::new("Tamil Dubbing in Progress").color(MUTED));
        if let Some(error) = &project.error_message {
            ui.colored_label(ERROR, error.as_str());
        }
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            ui.label(RichText::new("Overall Progress").strong());
            ui.label(RichText::new(format_percent(view.overall_progress)).color(MUTED));
        });
        ui.add(
            egui::ProgressBar::new(view.overall_progress / 100.0)
                .animate(view.playing)
                .fill(ACCENT),
        );
        ui.add_space(10.0);

        ui.horizontal_wrapped(|ui| {
            for step in &view.steps {
                let color = match step.state.status {
                    StepStatus::Completed => SUCCESS,
                    StepStatus::InProgress => ACCENT,
                    StepStatus::Failed => ERROR,
                    StepStatus::Waiting => MUTED,
                };
                ui.group(|ui| {
                    ui.set_min_width(130.0);
                    ui.vertical(|ui| {
                        let name = RichText::new(step.info.name);
                        let name = if step.info.id == view.active { name.strong() } else { name };
                        ui.label(name);
                        ui.colored_label(color, step.label());
                    });
                });
            }
        });

        ui.add_space(10.0);
        let active = view.active_step();
        ui.group(|ui| {
            ui.label(RichText::new(active.info.name).strong());
            ui.label(RichText::new(active.info.description).color(MUTED));
        });

        if project.status == ProjectStatus::Completed {
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("▶ Play").clicked() {
                    self.open_result(&project.id, "Play");
                }
                if ui.button("⬇ Download").clicked() {
                    self.open_result(&project.id, "Download");
                }
            });
        }
    }

    fn render_projects(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("My Projects").strong());
            if ui.small_button("⟳ Refresh").clicked() {
                self.refresh_projects();
            }
        });
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.search_query)
                    .hint_text("Search projects...")
                    .desired_width(220.0),
            );
            ui.selectable_value(&mut self.filter, StatusFilter::All, "All");
            for status in ProjectStatus::ALL {
                ui.selectable_value(&mut self.filter, StatusFilter::Only(status), status.label());
            }
        });
        ui.add_space(8.0);

        let rows: Vec<_> = self
            .projects
            .search(self.filter, &self.search_query)
            .into_iter()
            .cloned()
            .collect();
        if rows.is_empty() {
            ui.label(RichText::new("No projects found").color(MUTED));
            return;
        }

        let mut action: Option<(JobId, &'static str)> = None;
        egui::Grid::new("projects")
            .num_columns(5)
            .striped(true)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                for project in &rows {
                    if ui.link(project.title.as_str()).clicked() {
                        action = Some((project.id.clone(), "Open"));
                    }
                    ui.colored_label(status_color(project.status), project.status.label());
                    ui.add(
                        egui::ProgressBar::new(project.progress / 100.0)
                            .desired_width(160.0)
                            .text(format_percent(project.progress)),
                    );
                    ui.label(
                        project
                            .size_bytes
                            .map(FileSizeUtils::format_size)
                            .unwrap_or_default(),
                    );
                    ui.horizontal(|ui| {
                        if ui.small_button("▶").on_hover_text("Play").clicked() {
                            action = Some((project.id.clone(), "Play"));
                        }
                        if ui.small_button("⬇").on_hover_text("Download").clicked() {
                            action = Some((project.id.clone(), "Download"));
                        }
                    });
                    ui.end_row();
                }
            });

        match action {
            Some((id, "Open")) => self.select_project(id),
            Some((id, verb)) => self.open_result(&id, verb),
            None => {}
        }
    }

    fn render_profile(&mut self, ui: &mut egui::Ui) {
        let Some(user) = self.session.user().cloned() else {
            return;
        };
        let counts = self.projects.counts();

        ui.heading("Profile");
        ui.add_space(10.0);
        egui::Grid::new("profile")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Name").color(MUTED));
                ui.label(user.name.as_str());
                ui.end_row();
                ui.label(RichText::new("Email").color(MUTED));
                ui.label(user.email.as_str());
                ui.end_row();
                ui.label(RichText::new("Projects").color(MUTED));
                ui.label(format!("{} total, {} completed", counts.total, counts.completed));
                ui.end_row();
                ui.label(RichText::new("Backend").color(MUTED));
                ui.label(self.client.base_url());
                ui.end_row();
            });

        ui.add_space(16.0);
        if ui.button("Logout").clicked() {
            self.logout();
        }
    }
}
