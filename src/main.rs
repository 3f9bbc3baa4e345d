use anyhow::Context;
use dub_studio::app::DubbingApp;
use dub_studio::config::AppConfig;
use eframe::CreationContext;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,dub_studio=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let runtime = Arc::new(
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("dub-studio-worker")
            .build()
            .context("Failed to start async runtime")?,
    );
    let app = DubbingApp::new(config, runtime).context("Failed to initialize client")?;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([640.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Tamil Dub Cinema",
        options,
        Box::new(move |_cc: &CreationContext| Box::new(app)),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {}", e))
}
