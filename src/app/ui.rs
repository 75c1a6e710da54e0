use super::VisionApp;
use crate::controller::{BackendStatus, JobPhase};
use crate::utils::file_size::{format_size, ADVERTISED_UPLOAD_LIMIT};
use eframe::egui::{self, Align, Color32, RichText, Stroke};

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const SUCCESS: Color32 = Color32::from_rgb(0, 180, 0);
const DANGER: Color32 = Color32::from_rgb(220, 50, 50);
const MUTED: Color32 = Color32::from_rgb(150, 150, 150);

const PREVIEW_HEIGHT: f32 = 192.0;
const POSTER_HEIGHT: f32 = 256.0;

/// What the user clicked this frame. Applied after drawing so the widgets
/// can borrow the controller freely.
#[derive(Default)]
struct Actions {
    pick_image: bool,
    remove_image: bool,
    generate: bool,
    play: bool,
    download: bool,
    new_video: bool,
    recheck_backend: bool,
}

impl VisionApp {
    pub fn render(&mut self, ctx: &egui::Context) {
        let mut actions = Actions::default();

        egui::TopBottomPanel::bottom("footer")
            .show_separator_line(true)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                self.render_footer(ui, &mut actions);
                ui.add_space(6.0);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.heading(RichText::new("Vision2Video").color(ACCENT).strong());
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new("Transform images into dynamic videos")
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });
                ui.add_space(20.0);

                ui.columns(2, |columns| {
                    self.render_upload_card(&mut columns[0], &mut actions);
                    self.render_generation_card(&mut columns[1], &mut actions);
                });

                ui.add_space(20.0);
                self.render_prompt_card(ui);
                ui.add_space(20.0);
            });
        });

        self.apply(actions);
    }

    fn apply(&mut self, actions: Actions) {
        if actions.pick_image {
            self.pick_image();
        }
        if actions.remove_image {
            self.remove_image();
        }
        if actions.generate {
            self.start_generation();
        }
        if actions.play {
            self.play_video();
        }
        if actions.download {
            self.start_download();
        }
        if actions.new_video {
            self.start_new_video();
        }
        if actions.recheck_backend {
            self.recheck_backend();
        }
    }

    fn render_upload_card(&mut self, ui: &mut egui::Ui, actions: &mut Actions) {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("🖼 Upload Image").strong().size(16.0));
            ui.label(RichText::new("Drag and drop your image or click to browse").color(MUTED));
            ui.add_space(10.0);

            let asset = self.controller.asset();
            let Some(asset) = asset else {
                let stroke_color = if self.view.drop_hover { ACCENT } else { MUTED };
                egui::Frame::none()
                    .stroke(Stroke::new(2.0, stroke_color))
                    .rounding(8.0)
                    .inner_margin(24.0)
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.vertical_centered(|ui| {
                            ui.label(RichText::new("⬆").size(32.0).color(MUTED));
                            ui.label("Drop your image here");
                            ui.label(
                                RichText::new(format!(
                                    "PNG, JPG, WEBP up to {}",
                                    format_size(ADVERTISED_UPLOAD_LIMIT)
                                ))
                                .small()
                                .color(MUTED),
                            );
                            ui.add_space(8.0);
                            if ui.button("📁 Select Image").clicked() {
                                actions.pick_image = true;
                            }
                        });
                    });
                return;
            };

            match self.view.preview_texture(ui.ctx(), Some(asset)) {
                Some(texture) => {
                    ui.add(
                        egui::Image::from_texture(texture)
                            .max_height(PREVIEW_HEIGHT)
                            .max_width(ui.available_width())
                            .rounding(8.0),
                    );
                }
                None => {
                    ui.label(RichText::new("Preview unavailable").color(MUTED));
                }
            }

            ui.add_space(6.0);
            ui.label(format!("{} · {}", asset.file_name(), format_size(asset.size())));
            if asset.size() > ADVERTISED_UPLOAD_LIMIT {
                ui.label(
                    RichText::new("Larger than the advertised limit; the server may refuse it")
                        .small()
                        .color(MUTED),
                );
            }

            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let status = match self.controller.phase() {
                    JobPhase::Completed { .. } => "Processed",
                    JobPhase::Submitting | JobPhase::Polling { .. } => "Processing",
                    _ => "Ready to process",
                };
                ui.label(RichText::new(status).color(ACCENT));
                ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                    let can_remove = matches!(
                        self.controller.phase(),
                        JobPhase::Ready | JobPhase::Failed { .. }
                    );
                    if ui
                        .add_enabled(can_remove, egui::Button::new("Remove"))
                        .clicked()
                    {
                        actions.remove_image = true;
                    }
                });
            });
        });
    }

    fn render_generation_card(&mut self, ui: &mut egui::Ui, actions: &mut Actions) {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("🎬 Generated Video").strong().size(16.0));
            ui.label(RichText::new("Your AI-generated video will appear here").color(MUTED));
            ui.add_space(10.0);

            match self.controller.phase() {
                JobPhase::Submitting | JobPhase::Polling { .. } => {
                    let progress = self.controller.progress();
                    ui.vertical_centered(|ui| {
                        ui.add(egui::Spinner::new().size(32.0).color(ACCENT));
                        ui.add_space(8.0);
                        ui.label(RichText::new("Generating your video...").strong());
                        ui.label(RichText::new("This may take a few minutes").color(MUTED));
                        ui.add_space(8.0);
                    });
                    ui.add(
                        egui::ProgressBar::new(progress.fraction())
                            .fill(ACCENT)
                            .animate(false),
                    );
                    ui.vertical_centered(|ui| {
                        ui.label(
                            RichText::new(format!("{}% complete", progress.value())).color(MUTED),
                        );
                    });
                }
                JobPhase::Completed { job_id, .. } => {
                    let job_id = job_id.clone();
                    let poster = self.view.preview_texture(ui.ctx(), self.controller.asset());
                    egui::Frame::none()
                        .fill(Color32::BLACK)
                        .rounding(8.0)
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.vertical_centered(|ui| match poster {
                                Some(texture) => {
                                    ui.add(
                                        egui::Image::from_texture(texture)
                                            .max_height(POSTER_HEIGHT)
                                            .max_width(ui.available_width()),
                                    );
                                }
                                None => {
                                    ui.add_space(POSTER_HEIGHT / 2.0);
                                }
                            });
                        });
                    ui.label(RichText::new(format!("Job {}", job_id)).small().color(MUTED));
                    ui.add_space(8.0);

                    ui.horizontal(|ui| {
                        if ui.button("▶ Play").clicked() {
                            actions.play = true;
                        }
                        let downloading = self.controller.is_downloading();
                        let label = if downloading {
                            "Downloading..."
                        } else {
                            "⬇ Download"
                        };
                        if ui
                            .add_enabled(!downloading, egui::Button::new(label))
                            .clicked()
                        {
                            actions.download = true;
                        }
                        if ui.button("New Video").clicked() {
                            actions.new_video = true;
                        }
                    });
                }
                JobPhase::Idle | JobPhase::Ready | JobPhase::Failed { .. } => {
                    let has_image = self.controller.asset().is_some();
                    egui::Frame::none()
                        .stroke(Stroke::new(2.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
                        .rounding(8.0)
                        .inner_margin(24.0)
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.vertical_centered(|ui| {
                                ui.label(RichText::new("▶").size(32.0).color(MUTED));
                                ui.label("Upload an image to get started");
                                if has_image {
                                    ui.add_space(8.0);
                                    let button = egui::Button::new("✨ Generate Video")
                                        .min_size(egui::vec2(200.0, 36.0));
                                    if ui.add(button).clicked() {
                                        actions.generate = true;
                                    }
                                }
                            });
                        });
                }
            }
        });
    }

    fn render_prompt_card(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("✨ Enter Your Prompt").strong().size(16.0));
            ui.label(RichText::new("Describe the motion or scene you want to see.").color(MUTED));
            ui.add_space(8.0);
            ui.add(
                egui::TextEdit::multiline(self.controller.prompt_mut())
                    .hint_text("e.g., a person waving, cinematic, photorealistic...")
                    .desired_rows(4)
                    .desired_width(f32::INFINITY),
            );
        });
    }

    fn render_footer(&self, ui: &mut egui::Ui, actions: &mut Actions) {
        let base_url = &self.controller.config().base_url;
        ui.horizontal(|ui| {
            match self.controller.backend_status() {
                BackendStatus::Unknown => {
                    ui.add(egui::Spinner::new().size(12.0));
                    ui.label(RichText::new(format!("Connecting to {}", base_url)).color(MUTED));
                }
                BackendStatus::Online(message) => {
                    ui.colored_label(SUCCESS, "●");
                    ui.label(RichText::new(format!("{} ({})", message, base_url)).color(MUTED));
                }
                BackendStatus::Offline(error) => {
                    ui.colored_label(DANGER, "●");
                    ui.label(RichText::new(format!("Backend unreachable at {}", base_url)).color(DANGER))
                        .on_hover_text(error.as_str());
                    if ui.small_button("Retry").clicked() {
                        actions.recheck_backend = true;
                    }
                }
            }
        });
    }
}
