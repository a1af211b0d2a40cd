//! Overlays and dialogs: selected sheet card, source notice, toast, settings

use super::{App, SheetAction};
use crate::theme;
use crate::ui::components;
use eframe::egui;
use std::time::Duration;

const TOAST_VISIBLE: f32 = 3.0;
const TOAST_FADE: f32 = 0.5;

fn section_label(ui: &mut egui::Ui, text: &str) {
    ui.add(
        egui::Label::new(egui::RichText::new(text).size(theme::FONT_LABEL).color(theme::ACCENT))
            .selectable(false),
    );
    ui.add_space(theme::SPACING_XS);
}

fn section_break(ui: &mut egui::Ui) {
    ui.add_space(theme::SPACING_MD);
    ui.separator();
    ui.add_space(theme::SPACING_SM);
}

/// Small painted icon button; returns the response so callers can add tooltips
fn icon_button(ui: &mut egui::Ui, icon: &str, hover_color: egui::Color32) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(24.0, 24.0), egui::Sense::click());
    let color = if response.hovered() {
        ui.painter().rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_SURFACE);
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        hover_color
    } else {
        theme::TEXT_MUTED
    };
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(16.0),
        color,
    );
    response
}

/// Text input with a browse button. `filter` restricts the file dialog to
/// the given extensions.
fn path_field(ui: &mut egui::Ui, value: &mut String, hint: &str, filter: Option<(&str, &[&str])>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = theme::SPACING_SM;
        let browse_width = if filter.is_some() { 28.0 + theme::SPACING_SM } else { 0.0 };
        let text_width = (ui.available_width() - browse_width - 14.0).max(40.0);
        egui::Frame::new()
            .fill(theme::BG_INPUT)
            .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_SUBTLE))
            .corner_radius(theme::RADIUS_DEFAULT)
            .inner_margin(egui::Margin::symmetric(6, 4))
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::singleline(value)
                        .frame(false)
                        .hint_text(hint)
                        .desired_width(text_width)
                        .font(egui::FontId::proportional(theme::FONT_LABEL)),
                );
            });

        let Some((name, extensions)) = filter else {
            return;
        };
        let (rect, resp) = ui.allocate_exact_size(egui::vec2(28.0, 28.0), egui::Sense::click());
        if resp.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            ui.painter().rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_SURFACE);
        }
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            egui_phosphor::regular::FOLDER_OPEN,
            egui::FontId::proportional(16.0),
            theme::TEXT_SECONDARY,
        );
        if resp.on_hover_text("Browse").clicked() {
            if let Some(path) = rfd::FileDialog::new().add_filter(name, extensions).pick_file() {
                *value = path.to_string_lossy().to_string();
            }
        }
    });
}

impl App {
    /// Card pinned to the top-left of the map describing the selected sheet
    pub(crate) fn render_selected_card(&mut self, ctx: &egui::Context, rect: egui::Rect) -> Option<SheetAction> {
        let sheet = self.session.selected_sheet(&self.catalog)?.clone();
        let is_favorite = self.session.prefs.is_favorite(&sheet.id);
        let downloads = self.session.prefs.download_count(&sheet.id);

        let mut action = None;
        let mut close = false;
        let mut recenter = false;

        egui::Area::new(egui::Id::new("selected_card"))
            .fixed_pos(rect.left_top() + egui::vec2(theme::SPACING_LG, theme::SPACING_LG))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                theme::overlay_frame().show(ui, |ui| {
                    ui.set_width(theme::SELECTED_CARD_WIDTH);

                    ui.horizontal(|ui| {
                        components::sheet_badge(ui, &sheet.id);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if icon_button(ui, egui_phosphor::regular::X, theme::STATUS_ERROR)
                                .on_hover_text("Clear selection")
                                .clicked()
                            {
                                close = true;
                            }
                            if components::favorite_toggle(ui, is_favorite, 24.0).clicked() {
                                action = Some(SheetAction::ToggleFavorite(sheet.id.clone()));
                            }
                        });
                    });
                    ui.add_space(theme::SPACING_SM);

                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(&sheet.name)
                                .size(theme::FONT_HEADING)
                                .strong()
                                .color(theme::TEXT_PRIMARY),
                        )
                        .selectable(false)
                        .wrap(),
                    );
                    if let Some(name_ar) = &sheet.name_ar {
                        ui.add(
                            egui::Label::new(
                                egui::RichText::new(name_ar)
                                    .size(theme::FONT_BODY)
                                    .color(theme::TEXT_SECONDARY),
                            )
                            .selectable(false),
                        );
                    }
                    if sheet.geometry.is_none() {
                        ui.add(
                            egui::Label::new(
                                egui::RichText::new(format!(
                                    "{} Not marked on the index",
                                    egui_phosphor::regular::INFO
                                ))
                                .size(theme::FONT_SMALL)
                                .color(theme::TEXT_MUTED),
                            )
                            .selectable(false),
                        );
                    }
                    components::download_count_label(ui, downloads);

                    ui.add_space(theme::SPACING_MD);
                    ui.horizontal(|ui| {
                        let download = ui
                            .add(
                                theme::button_download(format!(
                                    "{}  Download",
                                    egui_phosphor::regular::DOWNLOAD_SIMPLE
                                ))
                                .min_size(egui::vec2(140.0, theme::BUTTON_HEIGHT)),
                            )
                            .on_hover_text(sheet.href.as_str());
                        if download.clicked() {
                            action = Some(SheetAction::Download(sheet.id.clone()));
                        }
                        if sheet.geometry.is_some()
                            && ui
                                .add(
                                    theme::button(format!("{}  Center", egui_phosphor::regular::CROSSHAIR))
                                        .min_size(egui::vec2(0.0, theme::BUTTON_HEIGHT)),
                                )
                                .clicked()
                        {
                            recenter = true;
                        }
                    });
                });
            });

        if close {
            self.session.clear_selection();
        }
        if recenter {
            self.session.select(&sheet.id, &self.catalog);
        }
        action
    }

    /// Attribution notice for the index image, dismissible for good
    pub(crate) fn render_source_toast(&mut self, ctx: &egui::Context, rect: egui::Rect) {
        if !self.show_source_toast {
            return;
        }
        let Some(source) = self.catalog.source_url().map(str::to_string) else {
            return;
        };

        let mut dismiss = false;
        egui::Area::new(egui::Id::new("source_toast"))
            .fixed_pos(egui::pos2(rect.right() - theme::SPACING_LG, rect.bottom() - theme::SPACING_LG))
            .pivot(egui::Align2::RIGHT_BOTTOM)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                theme::overlay_frame()
                    .inner_margin(egui::Margin::symmetric(12, 8))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(
                                egui::RichText::new("Index image:")
                                    .size(theme::FONT_SMALL)
                                    .color(theme::TEXT_MUTED),
                            );
                            ui.hyperlink_to(
                                egui::RichText::new(&source).size(theme::FONT_SMALL),
                                &source,
                            );
                            if icon_button(ui, egui_phosphor::regular::X, theme::TEXT_PRIMARY)
                                .on_hover_text("Hide this notice")
                                .clicked()
                            {
                                dismiss = true;
                            }
                        });
                    });
            });

        if dismiss {
            self.show_source_toast = false;
            self.save_settings();
        }
    }

    /// Transient message, bottom-center. Hovering holds it on screen.
    pub(crate) fn render_toast(&mut self, ctx: &egui::Context) {
        let Some(msg) = self.toast_message.clone() else {
            return;
        };
        let screen = ctx.screen_rect();
        let elapsed = self.toast_start.map(|t| t.elapsed().as_secs_f32()).unwrap_or(0.0);
        let alpha = if elapsed > TOAST_VISIBLE {
            ((TOAST_VISIBLE + TOAST_FADE - elapsed) / TOAST_FADE).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let response = egui::Area::new(egui::Id::new("toast"))
            .fixed_pos(egui::pos2(screen.center().x, screen.bottom() - 24.0))
            .pivot(egui::Align2::CENTER_BOTTOM)
            .order(egui::Order::Tooltip)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(theme::TEXT_PRIMARY.gamma_multiply(0.9 * alpha))
                    .corner_radius(6.0)
                    .inner_margin(egui::Margin::symmetric(16, 10))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(&msg).color(theme::TEXT_ON_ACCENT.gamma_multiply(alpha)));
                    });
            });

        if response.response.hovered() {
            self.toast_start = Some(std::time::Instant::now());
        }
        let elapsed = self.toast_start.map(|t| t.elapsed().as_secs_f32()).unwrap_or(0.0);
        if elapsed >= TOAST_VISIBLE + TOAST_FADE {
            self.toast_message = None;
            self.toast_start = None;
        } else if elapsed >= TOAST_VISIBLE {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(Duration::from_secs_f32(TOAST_VISIBLE - elapsed));
        }
    }

    pub(crate) fn render_settings_modal(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }

        let modal_response = egui::Modal::new(egui::Id::new("settings_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(80))
            .frame(theme::modal_frame())
            .show(ctx, |ui| {
                ui.set_width(360.0);

                ui.horizontal(|ui| {
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new("Settings").size(theme::FONT_HEADING).strong(),
                        )
                        .selectable(false),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if icon_button(ui, egui_phosphor::regular::X, theme::STATUS_ERROR).clicked() {
                            self.show_settings = false;
                        }
                    });
                });
                ui.add_space(theme::SPACING_SM);
                ui.separator();
                ui.add_space(theme::SPACING_SM);

                // View
                section_label(ui, "View");
                if theme::settings_checkbox(ui, self.compact_view, "Compact list (table)") {
                    self.compact_view = !self.compact_view;
                    self.save_settings();
                }
                if self.catalog.source_url().is_some()
                    && theme::settings_checkbox(ui, self.show_source_toast, "Show image source notice")
                {
                    self.show_source_toast = !self.show_source_toast;
                    self.save_settings();
                }

                section_break(ui);

                // Sources
                section_label(ui, "Catalog file");
                path_field(
                    ui,
                    &mut self.settings_draft.catalog_path,
                    "Built-in catalog",
                    Some(("Catalog", &["json"][..])),
                );
                ui.add_space(theme::SPACING_SM);
                section_label(ui, "Index image");
                path_field(ui, &mut self.settings_draft.raster_url, self.catalog.raster_url(), None);
                ui.add_space(theme::SPACING_SM);
                section_label(ui, "Extra font (Arabic names)");
                path_field(
                    ui,
                    &mut self.settings_draft.font_path,
                    "None",
                    Some(("Font", &["ttf", "otf"][..])),
                );
                ui.add_space(theme::SPACING_XS);
                ui.label(
                    egui::RichText::new("Source changes apply on next start")
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_MUTED),
                );

                section_break(ui);

                // Data
                section_label(ui, "Data");
                theme::section_frame().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    let prefs = &self.session.prefs;
                    let stats = format!(
                        "{} favorites, {} downloads",
                        prefs.favorites().len(),
                        prefs.total_downloads()
                    );
                    ui.label(egui::RichText::new(stats).size(theme::FONT_LABEL).color(theme::TEXT_PRIMARY));
                    let (status, color) = if self.prefs_persistent {
                        ("Saved between sessions", theme::TEXT_MUTED)
                    } else {
                        ("Storage unavailable, changes last until exit", theme::STATUS_ERROR)
                    };
                    ui.label(egui::RichText::new(status).size(theme::FONT_SMALL).color(color));
                });
                ui.add_space(theme::SPACING_SM);

                ui.horizontal(|ui| {
                    if ui
                        .add(theme::button(format!("{}  Open Folder", egui_phosphor::regular::FOLDER_OPEN)))
                        .on_hover_text(self.data_dir.display().to_string())
                        .clicked()
                    {
                        if let Err(e) = open::that_detached(&self.data_dir) {
                            tracing::warn!(error = %e, "Failed to open data folder");
                        }
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add(theme::button_accent(format!("{}  Save", egui_phosphor::regular::CHECK)))
                            .clicked()
                        {
                            self.save_settings();
                            self.show_settings = false;
                            self.show_toast("Settings saved");
                        }
                    });
                });
            });

        if modal_response.should_close() {
            self.show_settings = false;
        }
    }
}
