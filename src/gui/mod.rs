//! GUI module for the application.
//!
//! Provides a graphical interface using egui/eframe: the corner selector
//! canvas, the analysis result, purchase history and statistics.

pub mod render;
pub mod state;
pub mod worker;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use eframe::egui::{self, TextureHandle, Vec2};

use crate::client::types::decode_data_url;
use crate::client::ApiClient;
use crate::config::AppConfig;
use crate::selector::{preview, CornerSelector};

use state::{GuiState, LoadedPhoto, StatusMessage, Tab};
use worker::{Job, JobResult, Worker};

/// Textures returned by the backend for the current analysis.
#[derive(Default)]
struct ResultTextures {
    transformed: Option<TextureHandle>,
    corrected: Option<TextureHandle>,
}

/// Main GUI application struct.
pub struct LottoApp {
    state: GuiState,
    selector: CornerSelector,
    worker: Worker,
    /// Decoded photo, kept for the selection preview
    photo_image: Option<image::RgbaImage>,
    photo_texture: Option<TextureHandle>,
    result_textures: ResultTextures,
    /// Original photo of the opened history entry
    detail_texture: Option<TextureHandle>,
}

impl LottoApp {
    /// Create a new GUI application instance.
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, client: ApiClient) -> Self {
        Self::setup_fonts(&cc.egui_ctx);

        let selector = CornerSelector::new(config.selector.clone());
        let mut worker = Worker::new(client, config);
        worker.spawn(Job::ServerStatus);

        Self {
            selector,
            state: GuiState::default(),
            worker,
            photo_image: None,
            photo_texture: None,
            result_textures: ResultTextures::default(),
            detail_texture: None,
        }
    }

    /// Setup fonts with Korean support. Slip text and backend messages are Korean.
    fn setup_fonts(ctx: &egui::Context) {
        let mut fonts = egui::FontDefinitions::default();

        let font_paths = [
            "C:\\Windows\\Fonts\\malgun.ttf",
            "/System/Library/Fonts/AppleSDGothicNeo.ttc",
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
        ];

        for font_path in &font_paths {
            if let Ok(font_data) = std::fs::read(font_path) {
                fonts
                    .font_data
                    .insert("korean_font".to_owned(), egui::FontData::from_owned(font_data).into());

                // Fallback after the default font so Latin text keeps its look
                for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
                    fonts
                        .families
                        .entry(family)
                        .or_default()
                        .push("korean_font".to_owned());
                }

                log::info!("Loaded Korean font from: {}", font_path);
                ctx.set_fonts(fonts);
                return;
            }
        }

        log::warn!("Could not load a Korean font. Hangul may not display correctly.");
    }

    fn load_texture(ctx: &egui::Context, name: &str, rgba: &image::RgbaImage) -> TextureHandle {
        let size = [rgba.width() as usize, rgba.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR)
    }

    fn decode_result_texture(ctx: &egui::Context, name: &str, data_url: &str) -> Option<TextureHandle> {
        let decoded = decode_data_url(data_url)
            .and_then(|bytes| image::load_from_memory(&bytes).context("Failed to decode result image"));
        match decoded {
            Ok(img) => Some(Self::load_texture(ctx, name, &img.to_rgba8())),
            Err(e) => {
                log::warn!("GUI: {} image not shown: {:#}", name, e);
                None
            }
        }
    }

    /// Handle open photo button click.
    fn handle_open_photo(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .set_directory(crate::paths::get_default_photo_dir())
            .add_filter("Images", &["jpg", "jpeg", "png", "webp", "bmp"])
            .pick_file()
        else {
            return;
        };

        match self.load_photo(ctx, &path) {
            Ok(()) => {
                log::info!("GUI: Loaded photo {}", path.display());
                self.state.status = Some(StatusMessage::info("Drag the corners onto the slip"));
            }
            Err(e) => {
                log::error!("GUI: Failed to load {}: {:#}", path.display(), e);
                self.state.status = Some(StatusMessage::error(format!("Could not open image: {}", e)));
            }
        }
    }

    fn load_photo(&mut self, ctx: &egui::Context, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let rgba = self.selector.initialize_from_bytes(&bytes)?;

        // The new photo supersedes the old one and its analysis
        self.result_textures = ResultTextures::default();
        self.photo_texture = Some(Self::load_texture(ctx, "photo", &rgba));
        self.photo_image = Some(rgba);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "slip.jpg".to_string());
        self.state.clear_session();
        self.state.photo = Some(LoadedPhoto {
            path: path.to_path_buf(),
            file_name,
            bytes,
        });
        Ok(())
    }

    /// Handle analyze button click.
    fn handle_analyze(&mut self) {
        let (Some(photo), Some(corners_json)) = (&self.state.photo, self.selector.corners_json()) else {
            return;
        };
        let job = Job::Submit {
            session: self.state.session,
            file_name: photo.file_name.clone(),
            image: photo.bytes.clone(),
            corners_json,
        };
        if !self.state.begin_submission() {
            log::debug!("GUI: Submission already in flight");
            return;
        }
        self.worker.spawn(job);
    }

    /// Handle save to history click.
    fn handle_save(&mut self) {
        let (Some(photo), Some(submission)) = (&self.state.photo, &self.state.submission) else {
            return;
        };
        let job = Job::Save {
            file_name: photo.file_name.clone(),
            image: photo.bytes.clone(),
            analysis_result: submission.payload.clone(),
        };
        self.state.saving = true;
        self.worker.spawn(job);
    }

    fn handle_open_analysis(&mut self, id: String) {
        if self.state.loading_detail {
            return;
        }
        log::info!("GUI: Opening saved analysis #{}", id);
        self.state.loading_detail = true;
        self.worker.spawn(Job::LoadAnalysis { id });
    }

    fn handle_refresh_statistics(&mut self) {
        if self.state.loading_statistics {
            return;
        }
        self.state.loading_statistics = true;
        self.worker.spawn(Job::RefreshStatistics);
    }

    /// Handle save preview click.
    fn handle_save_preview(&mut self) {
        let (Some(img), Some(corners)) = (&self.photo_image, self.selector.corners()) else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .set_file_name("selection_preview.png")
            .add_filter("PNG", &["png"])
            .save_file()
        else {
            return;
        };

        let preview_image = preview::render_selection_preview(img, corners);
        match preview::save_preview(&preview_image, &path) {
            Ok(()) => {
                self.state.status = Some(StatusMessage::info(format!("Preview saved: {}", path.display())));
            }
            Err(e) => {
                log::error!("GUI: Failed to save preview: {:#}", e);
                self.state.status = Some(StatusMessage::error(format!("Could not save preview: {}", e)));
            }
        }
    }

    /// Handle export charts click.
    fn handle_export(&mut self) {
        let Some(snapshot) = &self.state.statistics else {
            return;
        };
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let output_dir = crate::paths::get_reports_dir().join(timestamp);

        log::info!("GUI: Exporting charts to {}", output_dir.display());
        match crate::analysis::export_report(
            &snapshot.report,
            &crate::paths::get_chart_config_path(),
            &output_dir,
        ) {
            Ok((chart_paths, json_path)) => {
                log::info!(
                    "GUI: Charts generated: {} files, stats: {}",
                    chart_paths.len(),
                    json_path.display()
                );
                self.state.status = Some(StatusMessage::info(format!(
                    "Exported {} charts and {}",
                    chart_paths.len(),
                    json_path.display()
                )));
                self.state.export_dir = Some(output_dir);
            }
            Err(e) => {
                log::error!("GUI: Failed to export charts: {:#}", e);
                self.state.status = Some(StatusMessage::error(format!("Export failed: {}", e)));
            }
        }
    }

    /// Handle clear click: drop the photo, corners, result and textures.
    fn handle_clear(&mut self) {
        self.selector.clear();
        self.photo_image = None;
        self.photo_texture = None;
        self.result_textures = ResultTextures::default();
        self.state.clear_session();
        log::info!("GUI: Session cleared");
    }

    /// Fold finished jobs into the state.
    fn poll_worker(&mut self, ctx: &egui::Context) {
        for result in self.worker.poll() {
            match result {
                JobResult::Submitted { session, result } => {
                    if session != self.state.session {
                        self.state.apply_submission(session, result);
                        continue;
                    }
                    // Superseded either way
                    self.result_textures = ResultTextures::default();
                    if result.success {
                        self.result_textures.transformed = result
                            .transformed_image()
                            .and_then(|url| Self::decode_result_texture(ctx, "transformed", url));
                        self.result_textures.corrected = result
                            .corrected_image()
                            .and_then(|url| Self::decode_result_texture(ctx, "corrected", url));
                    }
                    self.state.apply_submission(session, result);
                }
                JobResult::Saved(result) => {
                    let saved = result.is_ok();
                    self.state.apply_saved(result);
                    if saved && self.state.statistics.is_some() {
                        self.handle_refresh_statistics();
                    }
                }
                JobResult::Statistics(result) => self.state.apply_statistics(result),
                JobResult::AnalysisDetail(result) => {
                    if let Ok(detail) = &result {
                        self.detail_texture = detail
                            .original_image
                            .as_deref()
                            .and_then(|data| Self::decode_result_texture(ctx, "saved photo", data));
                    }
                    self.state.apply_analysis_detail(result);
                }
                JobResult::ServerStatus {
                    health,
                    ocr,
                    latest,
                } => self.state.apply_server_status(health, ocr, latest),
            }
        }
    }
}

impl eframe::App for LottoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_worker(ctx);

        // Keep polling while requests are outstanding
        if self.worker.in_flight() > 0 {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            if render::render_header(ui, &mut self.state)
                && self.state.tab != Tab::Scan
                && self.state.statistics.is_none()
            {
                self.handle_refresh_statistics();
            }
            render::render_status(ui, self.state.status.as_ref(), self.state.is_busy());
            ui.add_space(2.0);
        });

        match self.state.tab {
            Tab::Scan => {
                let mut save_clicked = false;
                egui::SidePanel::right("result")
                    .default_width(320.0)
                    .show(ctx, |ui| {
                        egui::ScrollArea::vertical().show(ui, |ui| {
                            save_clicked = render::render_result(
                                ui,
                                &self.state,
                                self.result_textures.transformed.as_ref(),
                                self.result_textures.corrected.as_ref(),
                            );
                        });
                    });
                if save_clicked {
                    self.handle_save();
                }

                let mut actions = render::ScanActions::default();
                egui::CentralPanel::default().show(ctx, |ui| {
                    actions = render::render_scan_toolbar(ui, &self.state, &self.selector);
                    ui.add_space(8.0);
                    egui::ScrollArea::both().show(ui, |ui| {
                        render::render_canvas(ui, &mut self.selector, self.photo_texture.as_ref());
                    });
                });

                if actions.open_photo {
                    self.handle_open_photo(ctx);
                }
                if actions.analyze {
                    self.handle_analyze();
                }
                if actions.reset_corners {
                    self.selector.reset();
                }
                if actions.save_preview {
                    self.handle_save_preview();
                }
                if actions.clear {
                    self.handle_clear();
                }
            }
            Tab::History => {
                let mut close_detail = false;
                if let Some(detail) = &self.state.history_detail {
                    egui::SidePanel::right("history_detail")
                        .default_width(320.0)
                        .show(ctx, |ui| {
                            egui::ScrollArea::vertical().show(ui, |ui| {
                                close_detail = render::render_history_detail(
                                    ui,
                                    detail,
                                    self.detail_texture.as_ref(),
                                );
                            });
                        });
                }
                if close_detail {
                    self.state.history_detail = None;
                    self.detail_texture = None;
                }

                let mut actions = render::HistoryActions::default();
                egui::CentralPanel::default().show(ctx, |ui| {
                    actions = render::render_history(ui, &self.state);
                });
                if actions.refresh {
                    self.handle_refresh_statistics();
                }
                if let Some(id) = actions.open {
                    self.handle_open_analysis(id);
                }
            }
            Tab::Statistics => {
                let mut actions = render::StatisticsActions::default();
                egui::CentralPanel::default().show(ctx, |ui| {
                    actions = render::render_statistics(ui, &self.state);
                });
                if actions.refresh {
                    self.handle_refresh_statistics();
                }
                if actions.export {
                    self.handle_export();
                }
            }
        }
    }
}

/// Run the GUI application.
/// This function blocks until the window is closed.
pub fn run_gui(config: AppConfig) -> Result<()> {
    let client = ApiClient::new(&config.api)?;
    log::info!("GUI: Backend at {}", client.base_url());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(Vec2::new(1200.0, 800.0))
            .with_min_inner_size(Vec2::new(800.0, 600.0))
            .with_title("Lotto Slip Scanner"),
        ..Default::default()
    };

    eframe::run_native(
        "Lotto Slip Scanner",
        options,
        Box::new(move |cc| {
            log::info!("GUI: Creating LottoApp instance...");
            Ok(Box::new(LottoApp::new(cc, config, client)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}
