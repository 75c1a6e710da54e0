//! `vision2video` -- desktop client for the image-to-video job API.
//!
//! Loads `.env`, reads configuration from the environment (see
//! [`vision2video::config`]), starts a tokio runtime for network work and
//! opens the egui window.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vision2video::app::VisionApp;
use vision2video::config::ApiConfig;
use vision2video::controller::JobController;

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vision2video=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to start async runtime");
        std::process::exit(1);
    });

    tracing::info!(base_url = %config.base_url, "Starting Vision2Video");
    let controller = JobController::new(config, runtime.handle().clone());

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([640.0, 520.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Vision2Video",
        options,
        Box::new(move |cc| Box::new(VisionApp::new(cc, controller))),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Window closed with an error");
        std::process::exit(1);
    }
}
