mod state;
mod ui;

use crate::api::download::DEFAULT_FILE_NAME;
use crate::controller::{BackendStatus, ControllerNotice, JobController};
use crate::upload::{self, AssetOrigin, UploadedAsset};
use eframe::{egui, App};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
pub use state::{decode_preview, ViewState};
use std::path::Path;
use std::time::Duration;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
const BUSY_REPAINT_INTERVAL: Duration = Duration::from_millis(100);

pub struct VisionApp {
    controller: JobController,
    view: ViewState,
}

impl VisionApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, mut controller: JobController) -> Self {
        tracing::info!("Initializing Vision2Video");
        controller.check_backend();
        Self {
            controller,
            view: ViewState::default(),
        }
    }

    pub fn pick_image(&mut self) {
        let Some(path) = FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        self.load_image(&path, AssetOrigin::Picker);
    }

    fn load_image(&mut self, path: &Path, origin: AssetOrigin) {
        match upload::load_from_path(path) {
            Ok(asset) => self.accept(asset, origin),
            Err(e) => tracing::error!(error = %e, "Failed to read image"),
        }
    }

    fn accept(&mut self, asset: UploadedAsset, origin: AssetOrigin) {
        if let Err(e) = self.controller.accept_image(asset, origin) {
            tracing::warn!(error = %e, "Image not accepted");
        }
    }

    /// Only the first dropped file counts, and only while no image is loaded.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.clone(),
            )
        });
        self.view.drop_hover = hovering && self.controller.asset().is_none();

        if self.controller.asset().is_some() {
            return;
        }
        let Some(file) = dropped.into_iter().next() else {
            return;
        };

        if let Some(path) = &file.path {
            self.load_image(path, AssetOrigin::Drop);
        } else if let Some(bytes) = &file.bytes {
            let asset = UploadedAsset::new(file.name.clone(), bytes.to_vec(), None);
            self.accept(asset, AssetOrigin::Drop);
        }
    }

    pub fn remove_image(&mut self) {
        match self.controller.remove_image() {
            Ok(()) => self.view.clear(),
            Err(e) => tracing::warn!(error = %e, "Cannot remove image"),
        }
    }

    pub fn start_generation(&mut self) {
        if let Err(e) = self.controller.submit() {
            tracing::warn!(error = %e, "Generation not started");
        }
    }

    pub fn start_download(&mut self) {
        let Some(destination) = FileDialog::new()
            .set_file_name(DEFAULT_FILE_NAME)
            .add_filter("MP4 video", &["mp4"])
            .save_file()
        else {
            return;
        };
        if let Err(e) = self.controller.download(destination) {
            tracing::warn!(error = %e, "Download not started");
        }
    }

    pub fn play_video(&self) {
        if let Some(url) = self.controller.video_url() {
            if let Err(e) = open::that(url) {
                tracing::error!(url = %url, error = %e, "Failed to open video");
            }
        }
    }

    pub fn recheck_backend(&mut self) {
        self.controller.check_backend();
    }

    pub fn start_new_video(&mut self) {
        self.controller.reset();
        self.view.clear();
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        for notice in self.controller.process_events() {
            match notice {
                ControllerNotice::DownloadSaved { destination, bytes } => {
                    tracing::info!(destination = %destination.display(), bytes, "Download finished");
                }
                ControllerNotice::DownloadFailed { message, .. } => {
                    let description = format!(
                        "Failed to download video. Please try again.\n\n{}",
                        message
                    );
                    let _ = MessageDialog::new()
                        .set_level(MessageLevel::Error)
                        .set_title("Download failed")
                        .set_description(&description)
                        .set_buttons(MessageButtons::Ok)
                        .show();
                }
            }
        }

        let waiting = self.controller.phase().is_busy()
            || self.controller.is_downloading()
            || *self.controller.backend_status() == BackendStatus::Unknown;
        if waiting {
            ctx.request_repaint_after(BUSY_REPAINT_INTERVAL);
        }
    }
}

impl App for VisionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.handle_dropped_files(ctx);
        self.render(ctx);
    }
}
