//! GUI rendering functions.
//!
//! Contains UI layout and component rendering logic. Functions report
//! clicks back to the caller instead of acting on them.

use eframe::egui::{self, Color32, RichText, Sense, Stroke, TextureHandle, Vec2};
use egui_plot::{Bar, BarChart, Plot};

use super::state::{GuiState, StatusMessage, Tab};
use crate::analysis::{PrizeRank, TicketOutcome};
use crate::client::types::SavedAnalysisDetail;
use crate::selector::{CornerSelector, Point, MARKER_RADIUS};

const OUTLINE_COLOR: Color32 = Color32::from_rgb(0, 200, 0);
const MARKER_COLOR: Color32 = Color32::from_rgb(220, 40, 40);
const ACTIVE_MARKER_COLOR: Color32 = Color32::from_rgb(255, 160, 0);
const ERROR_COLOR: Color32 = Color32::from_rgb(200, 0, 0);
const OK_COLOR: Color32 = Color32::from_rgb(0, 150, 0);

/// Buttons on the scan toolbar.
#[derive(Debug, Default)]
pub struct ScanActions {
    pub open_photo: bool,
    pub analyze: bool,
    pub reset_corners: bool,
    pub clear: bool,
    pub save_preview: bool,
}

/// Render the tab bar and server status line.
pub fn render_header(ui: &mut egui::Ui, state: &mut GuiState) -> bool {
    let mut tab_changed = false;
    ui.horizontal(|ui| {
        for (tab, label) in [
            (Tab::Scan, "📷 Scan"),
            (Tab::History, "📜 History"),
            (Tab::Statistics, "📊 Statistics"),
        ] {
            if ui.selectable_label(state.tab == tab, label).clicked() && state.tab != tab {
                state.tab = tab;
                tab_changed = true;
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if let Some(draw) = &state.latest_draw {
                let numbers: Vec<String> = draw.numbers.iter().map(u32::to_string).collect();
                ui.label(format!(
                    "Latest draw {}: {} + {}",
                    draw.draw_no,
                    numbers.join(" "),
                    draw.bonus
                ));
                ui.separator();
            }
            match &state.ocr_status {
                Some(status) if status.ocr_available => {
                    ui.label(RichText::new("OCR ready").color(OK_COLOR));
                }
                Some(status) => {
                    ui.label(RichText::new("OCR unavailable").color(ERROR_COLOR))
                        .on_hover_text(status.message.as_str());
                }
                None if state.server_online => {
                    ui.label(RichText::new("OCR status unknown").color(Color32::GRAY));
                }
                None => {
                    ui.label(RichText::new("Server offline").color(Color32::GRAY));
                }
            }
        });
    });
    tab_changed
}

/// Render the status line with a spinner while requests are outstanding.
pub fn render_status(ui: &mut egui::Ui, status: Option<&StatusMessage>, busy: bool) {
    ui.horizontal(|ui| {
        if busy {
            ui.add(egui::Spinner::new());
        }
        if let Some(status) = status {
            let color = if status.is_error {
                ERROR_COLOR
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(&status.text).color(color));
        }
    });
}

/// Render the scan toolbar.
pub fn render_scan_toolbar(
    ui: &mut egui::Ui,
    state: &GuiState,
    selector: &CornerSelector,
) -> ScanActions {
    let mut actions = ScanActions::default();
    let ready = selector.is_ready();

    ui.horizontal(|ui| {
        ui.add_enabled_ui(!state.submitting, |ui| {
            if ui.button("📂 Open photo").clicked() {
                actions.open_photo = true;
            }
        });
        ui.add_enabled_ui(ready && !state.submitting, |ui| {
            if ui.button(RichText::new("▶ Analyze").strong()).clicked() {
                actions.analyze = true;
            }
        });
        ui.add_enabled_ui(ready, |ui| {
            if ui.button("↺ Reset corners").clicked() {
                actions.reset_corners = true;
            }
            if ui.button("💾 Save preview").clicked() {
                actions.save_preview = true;
            }
        });
        ui.add_enabled_ui((ready || state.submission.is_some()) && !state.submitting, |ui| {
            if ui.button("✕ Clear").clicked() {
                actions.clear = true;
            }
        });
    });

    if let Some(photo) = &state.photo {
        let label = match selector.image_size() {
            Some((width, height)) => format!("{} ({}×{})", photo.path.display(), width, height),
            None => photo.path.display().to_string(),
        };
        ui.label(RichText::new(label).small());
    }
    actions
}

/// Render the photo with its corner overlay and apply pointer input to
/// the selector.
pub fn render_canvas(
    ui: &mut egui::Ui,
    selector: &mut CornerSelector,
    texture: Option<&TextureHandle>,
) {
    let (Some(transform), Some(texture)) = (selector.transform(), texture) else {
        let (rect, _) = ui.allocate_exact_size(Vec2::new(400.0, 300.0), Sense::hover());
        ui.painter().rect_filled(rect, 4.0, Color32::from_gray(200));
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "Open a photo of a lottery slip",
            egui::FontId::proportional(16.0),
            Color32::from_gray(90),
        );
        return;
    };

    let size = Vec2::new(
        transform.display_width as f32,
        transform.display_height as f32,
    );
    let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
    let origin = response.rect.min;
    let to_local = |pos: egui::Pos2| Point::new((pos.x - origin.x) as f64, (pos.y - origin.y) as f64);
    let to_screen = |p: Point| egui::pos2(origin.x + p.x as f32, origin.y + p.y as f32);

    if response.drag_started() {
        let press = ui
            .input(|i| i.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos());
        if let Some(pos) = press {
            selector.begin_drag(to_local(pos));
        }
    }
    if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            selector.drag_to(to_local(pos));
        }
    }
    if response.drag_stopped() {
        selector.end_drag();
    }

    painter.image(
        texture.id(),
        response.rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        Color32::WHITE,
    );

    let Some(overlay) = selector.overlay() else {
        return;
    };
    for (a, b) in overlay.segments() {
        painter.line_segment([to_screen(a), to_screen(b)], Stroke::new(2.0, OUTLINE_COLOR));
    }
    for (index, marker) in overlay.markers.iter().enumerate() {
        let color = if selector.dragging() == Some(index) {
            ACTIVE_MARKER_COLOR
        } else {
            MARKER_COLOR
        };
        let center = to_screen(marker.center);
        painter.circle_filled(center, MARKER_RADIUS as f32, color.gamma_multiply(0.8));
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            &marker.label,
            egui::FontId::proportional(12.0),
            Color32::WHITE,
        );
    }

    if response.hovered() && selector.dragging().is_none() {
        if let Some(pos) = response.hover_pos() {
            if selector.hit_test(to_local(pos)).is_some() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
            }
        }
    }
}

fn outcome_color(outcome: TicketOutcome) -> Color32 {
    match outcome {
        TicketOutcome::Win(PrizeRank::First | PrizeRank::Second) => Color32::from_rgb(230, 126, 34),
        TicketOutcome::Win(_) => OK_COLOR,
        TicketOutcome::NoWin => Color32::GRAY,
        TicketOutcome::Undetermined => Color32::from_rgb(90, 120, 200),
    }
}

fn format_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the analysis result panel. Returns true if "Save" was clicked.
pub fn render_result(
    ui: &mut egui::Ui,
    state: &GuiState,
    transformed: Option<&TextureHandle>,
    corrected: Option<&TextureHandle>,
) -> bool {
    let mut save_clicked = false;
    ui.heading("Result");
    ui.add_space(4.0);

    let Some(fields) = &state.fields else {
        ui.label(RichText::new("No analysis yet").color(Color32::GRAY));
        return false;
    };

    egui::Grid::new("result_fields")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            let rows = [
                ("Draw", fields.draw_number.map(|n| n.to_string())),
                ("Issued", fields.issue_date.clone()),
                ("Draw date", fields.draw_date.clone()),
                ("Pay by", fields.payment_deadline.clone()),
            ];
            for (label, value) in rows {
                ui.label(label);
                ui.label(value.unwrap_or_else(|| "-".to_string()));
                ui.end_row();
            }
        });

    ui.add_space(6.0);
    ui.label(RichText::new("Numbers").strong());
    let latest = state
        .latest_draw
        .as_ref()
        .filter(|draw| Some(draw.draw_no) == fields.draw_number)
        .map(|draw| draw.winning_numbers());
    for (i, combination) in fields.extracted_combinations.iter().enumerate() {
        ui.horizontal(|ui| {
            ui.monospace(format!("{}  {}", (b'A' + (i % 26) as u8) as char, format_numbers(combination)));
            if let Some(draw) = &latest {
                let outcome = crate::analysis::prize::ticket_outcome(combination, Some(draw));
                ui.label(RichText::new(outcome.to_string()).color(outcome_color(outcome)));
            }
        });
    }
    if !fields.extracted_amounts.is_empty() {
        ui.label(format!("Amount: {}", fields.extracted_amounts.join(", ")));
    }

    if !state.rule_checks.is_empty() {
        ui.add_space(6.0);
        ui.label(RichText::new("Checks").strong());
        for check in &state.rule_checks {
            let (mark, color) = if check.passed {
                ("✔", OK_COLOR)
            } else {
                ("✘", ERROR_COLOR)
            };
            ui.label(RichText::new(format!("{} {}", mark, check.message)).color(color));
        }
    }

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        let can_save = state.saved_id.is_none() && !state.saving && state.photo.is_some();
        ui.add_enabled_ui(can_save, |ui| {
            if ui.button("💾 Save to history").clicked() {
                save_clicked = true;
            }
        });
        if let Some(id) = &state.saved_id {
            ui.label(RichText::new(format!("Saved #{}", id)).color(OK_COLOR));
        }
    });

    for (title, texture) in [("Straightened", transformed), ("Corrected", corrected)] {
        if let Some(texture) = texture {
            ui.add_space(8.0);
            ui.label(RichText::new(title).strong());
            let tex_size = texture.size_vec2();
            let width = ui.available_width().min(tex_size.x);
            let height = width * tex_size.y / tex_size.x.max(1.0);
            ui.image((texture.id(), Vec2::new(width, height)));
        }
    }

    save_clicked
}

/// Clicks from the history page.
#[derive(Debug, Default)]
pub struct HistoryActions {
    pub refresh: bool,
    /// Id of the row whose details were requested
    pub open: Option<String>,
}

/// Render the history table.
pub fn render_history(ui: &mut egui::Ui, state: &GuiState) -> HistoryActions {
    let mut actions = HistoryActions::default();
    ui.horizontal(|ui| {
        ui.heading("Purchase history");
        ui.add_enabled_ui(!state.loading_statistics, |ui| {
            if ui.button("⟳ Refresh").clicked() {
                actions.refresh = true;
            }
        });
    });
    ui.add_space(6.0);

    let rows = state.history_rows();
    if rows.is_empty() {
        ui.label(RichText::new("No saved analyses").color(Color32::GRAY));
        return actions;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Grid::new("history_table")
            .striped(true)
            .num_columns(5)
            .spacing([16.0, 4.0])
            .show(ui, |ui| {
                ui.label(RichText::new("#").strong());
                ui.label(RichText::new("Saved").strong());
                ui.label(RichText::new("Draw").strong());
                ui.label(RichText::new("Lines").strong());
                ui.label("");
                ui.end_row();

                for row in &rows {
                    ui.label(row.id.as_str());
                    ui.label(row.timestamp.as_str());
                    ui.label(row.draw_number.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()));
                    ui.vertical(|ui| {
                        for (numbers, outcome) in &row.lines {
                            ui.horizontal(|ui| {
                                ui.monospace(format_numbers(numbers));
                                ui.label(RichText::new(outcome.to_string()).color(outcome_color(*outcome)));
                            });
                        }
                    });
                    ui.add_enabled_ui(!state.loading_detail, |ui| {
                        if ui.button("View").clicked() {
                            actions.open = Some(row.id.clone());
                        }
                    });
                    ui.end_row();
                }
            });
    });
    actions
}

/// Render an opened saved analysis. Returns true if it was closed.
pub fn render_history_detail(
    ui: &mut egui::Ui,
    detail: &SavedAnalysisDetail,
    photo: Option<&TextureHandle>,
) -> bool {
    let mut close_clicked = false;
    ui.horizontal(|ui| {
        ui.heading(format!("Analysis #{}", detail.id));
        if ui.button("✕").clicked() {
            close_clicked = true;
        }
    });
    ui.label(RichText::new(detail.timestamp.as_str()).color(Color32::GRAY));
    ui.separator();

    let fields = &detail.analysis_result;
    egui::Grid::new("history_detail_fields")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label("Draw");
            ui.label(fields.draw_number.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()));
            ui.end_row();
            ui.label("Issued");
            ui.label(fields.issue_date.as_deref().unwrap_or("-"));
            ui.end_row();
            ui.label("Amount");
            if fields.extracted_amounts.is_empty() {
                ui.label("-");
            } else {
                ui.label(fields.extracted_amounts.join(", "));
            }
            ui.end_row();
        });
    for numbers in &fields.extracted_combinations {
        ui.monospace(format_numbers(numbers));
    }

    if let Some(texture) = photo {
        ui.add_space(8.0);
        let tex_size = texture.size_vec2();
        let width = ui.available_width().min(tex_size.x);
        let height = width * tex_size.y / tex_size.x.max(1.0);
        ui.image((texture.id(), Vec2::new(width, height)));
    }
    close_clicked
}

/// Clicks from the statistics page.
#[derive(Debug, Default)]
pub struct StatisticsActions {
    pub refresh: bool,
    pub export: bool,
}

/// Render the statistics page.
pub fn render_statistics(ui: &mut egui::Ui, state: &GuiState) -> StatisticsActions {
    let mut actions = StatisticsActions::default();
    ui.horizontal(|ui| {
        ui.heading("Statistics");
        ui.add_enabled_ui(!state.loading_statistics, |ui| {
            if ui.button("⟳ Refresh").clicked() {
                actions.refresh = true;
            }
        });
        ui.add_enabled_ui(state.statistics.is_some(), |ui| {
            if ui.button("📊 Export charts").clicked() {
                actions.export = true;
            }
        });
        if let Some(dir) = &state.export_dir {
            ui.label(RichText::new(dir.display().to_string()).small());
        }
    });
    ui.add_space(6.0);

    let Some(snapshot) = &state.statistics else {
        ui.label(RichText::new("Press Refresh to load saved analyses").color(Color32::GRAY));
        return actions;
    };
    let report = &snapshot.report;

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.label(format!("Slips: {}", report.total_analyses));
            ui.separator();
            ui.label(format!("Lines: {}", report.total_tickets));
            ui.separator();
            ui.label(format!("Spent: ₩{}", report.financials.total_spent));
            ui.separator();
            ui.label(format!("Won: ₩{}", report.financials.total_won));
            ui.separator();
            let net_color = if report.financials.net < 0 { ERROR_COLOR } else { OK_COLOR };
            ui.label(RichText::new(format!("Net: ₩{}", report.financials.net)).color(net_color));
        });
        if !report.unresolved_draws.is_empty() {
            let draws: Vec<String> = report.unresolved_draws.iter().map(u32::to_string).collect();
            ui.label(
                RichText::new(format!("Results unavailable for draws {}", draws.join(", ")))
                    .color(Color32::from_rgb(200, 150, 0)),
            );
        }

        ui.add_space(8.0);
        ui.label(RichText::new("Number frequency").strong());
        let bars: Vec<Bar> = report
            .number_frequency
            .iter()
            .map(|(n, count)| Bar::new(n as f64, count as f64).width(0.8).name(n))
            .collect();
        Plot::new("number_frequency")
            .height(220.0)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(Color32::from_rgb(52, 152, 219))
                        .name("Times played"),
                );
            });
        if !report.hot_numbers.is_empty() {
            let hot: Vec<String> = report
                .hot_numbers
                .iter()
                .map(|(n, c)| format!("{} ({})", n, c))
                .collect();
            ui.label(format!("Most played: {}", hot.join(", ")));
        }

        ui.add_space(8.0);
        ui.label(RichText::new("Monthly purchases").strong());
        let bars: Vec<Bar> = report
            .monthly_purchases
            .iter()
            .enumerate()
            .map(|(i, m)| Bar::new(i as f64, m.count as f64).width(0.7).name(&m.month))
            .collect();
        Plot::new("monthly_purchases")
            .height(180.0)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(Color32::from_rgb(46, 204, 113)));
            });

        ui.add_space(8.0);
        ui.label(RichText::new("Prizes").strong());
        egui::Grid::new("prize_table")
            .striped(true)
            .num_columns(2)
            .show(ui, |ui| {
                for rank in PrizeRank::ALL {
                    ui.label(rank.to_string());
                    ui.label(report.prizes.count(rank).to_string());
                    ui.end_row();
                }
                ui.label("No win");
                ui.label(report.prizes.no_win.to_string());
                ui.end_row();
                ui.label("Pending");
                ui.label(report.prizes.undetermined.to_string());
                ui.end_row();
            });
    });

    actions
}
