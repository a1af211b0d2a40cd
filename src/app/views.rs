//! View rendering: sidebar with live results, and the catalog list (cards or table)

use super::{App, SheetAction};
use crate::theme;
use crate::types::ViewMode;
use crate::ui::components;
use eframe::egui;

const FOOTER_HEIGHT: f32 = 32.0;

impl App {
    // ========================================================================
    // SIDEBAR
    // ========================================================================

    pub(crate) fn render_sidebar(&mut self, ctx: &egui::Context) {
        let mut actions: Vec<SheetAction> = Vec::new();

        egui::SidePanel::left("sheet_panel")
            .exact_width(theme::SIDEBAR_WIDTH)
            .resizable(false)
            .show_separator_line(false)
            .frame(theme::sidebar_frame())
            .show(ctx, |ui| {
                self.render_sidebar_header(ui);
                ui.add_space(theme::SPACING_LG);

                let mut map_active = self.view_mode == ViewMode::Map;
                if theme::segmented_toggle(ui, "Map", "List", &mut map_active) {
                    self.view_mode = self.view_mode.toggled();
                    self.save_settings();
                }
                ui.add_space(theme::SPACING_MD);

                self.render_search_box(ui);
                ui.add_space(theme::SPACING_MD);

                let list_height = (ui.available_height() - FOOTER_HEIGHT).max(0.0);
                if self.session.filtered.is_empty() {
                    ui.allocate_ui(egui::vec2(ui.available_width(), list_height), |ui| {
                        self.render_empty_state(ui);
                    });
                } else {
                    egui::ScrollArea::vertical()
                        .id_salt("sidebar_rows")
                        .auto_shrink([false, false])
                        .max_height(list_height)
                        .show_rows(ui, theme::ROW_HEIGHT, self.session.filtered.len(), |ui, range| {
                            ui.spacing_mut().item_spacing.y = 0.0;
                            for row in range {
                                let idx = self.session.filtered[row];
                                if let Some(action) = self.sidebar_row(ui, idx) {
                                    actions.push(action);
                                }
                            }
                        });
                }

                self.render_sidebar_footer(ui);
            });

        for action in actions {
            self.apply_sheet_action(ctx, action);
        }
    }

    fn render_sidebar_header(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if let Some(texture) = &self.logo_texture {
                let aspect = texture.size()[0] as f32 / texture.size()[1] as f32;
                ui.image(egui::load::SizedTexture::new(
                    texture.id(),
                    egui::vec2(theme::LOGO_SIZE * aspect, theme::LOGO_SIZE),
                ));
            }
            ui.vertical(|ui| {
                ui.add(
                    egui::Label::new(
                        egui::RichText::new(self.catalog_title())
                            .size(theme::FONT_TITLE)
                            .strong()
                            .color(theme::TEXT_PRIMARY),
                    )
                    .selectable(false)
                    .truncate(),
                );
                ui.add(
                    egui::Label::new(
                        egui::RichText::new(format!("{} sheets, 1:50 000", self.catalog.len()))
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_MUTED),
                    )
                    .selectable(false),
                );
            });
        });
    }

    fn render_search_box(&mut self, ui: &mut egui::Ui) {
        egui::Frame::new()
            .fill(theme::BG_INPUT)
            .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_SUBTLE))
            .corner_radius(theme::RADIUS_DEFAULT)
            .inner_margin(egui::Margin::symmetric(8, 8))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = theme::SPACING_SM;
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(egui_phosphor::regular::MAGNIFYING_GLASS)
                                .size(14.0)
                                .color(theme::TEXT_MUTED),
                        )
                        .selectable(false),
                    );

                    let clear_width = if self.session.query.is_empty() { 0.0 } else { 20.0 };
                    let search_id = ui.make_persistent_id("search_box");
                    let search_response = ui.add(
                        egui::TextEdit::singleline(&mut self.session.query)
                            .id(search_id)
                            .hint_text("Sheet name or number...")
                            .frame(false)
                            .desired_width(ui.available_width() - clear_width),
                    );
                    if self.focus_search {
                        self.focus_search = false;
                        search_response.request_focus();
                        // Keep typed-ahead characters: cursor to the end
                        if let Some(mut state) = egui::TextEdit::load_state(ui.ctx(), search_id) {
                            let ccursor = egui::text::CCursor::new(self.session.query.chars().count());
                            state
                                .cursor
                                .set_char_range(Some(egui::text::CCursorRange::one(ccursor)));
                            state.store(ui.ctx(), search_id);
                        }
                    }
                    if search_response.changed() {
                        self.apply_filters();
                    }

                    if !self.session.query.is_empty() {
                        let (rect, resp) =
                            ui.allocate_exact_size(egui::vec2(16.0, 16.0), egui::Sense::click());
                        let color = if resp.hovered() {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                            theme::TEXT_PRIMARY
                        } else {
                            theme::TEXT_MUTED
                        };
                        ui.painter().text(
                            rect.center(),
                            egui::Align2::CENTER_CENTER,
                            egui_phosphor::regular::X,
                            egui::FontId::proportional(13.0),
                            color,
                        );
                        if resp.on_hover_text("Clear search").clicked() {
                            self.session.set_query("", &self.catalog);
                        }
                    }
                });
            });
    }

    /// One painted result row. The download zone on the right is its own
    /// hit target layered over the row.
    fn sidebar_row(&self, ui: &mut egui::Ui, idx: usize) -> Option<SheetAction> {
        let sheet = &self.catalog.sheets()[idx];
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(ui.available_width(), theme::ROW_HEIGHT), egui::Sense::click());
        let download_rect = egui::Rect::from_center_size(
            egui::pos2(rect.right() - 16.0, rect.center().y),
            egui::vec2(24.0, 24.0),
        );
        let download_resp = ui.interact(download_rect, ui.id().with(("row_download", idx)), egui::Sense::click());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let is_selected = self.session.selected.as_deref() == Some(sheet.id.as_str());
            if is_selected {
                painter.rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_HOVER);
            } else if response.hovered() || download_resp.hovered() {
                painter.rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_INPUT);
            }

            let badge = components::paint_sheet_badge(painter, rect.left_center() + egui::vec2(6.0, 0.0), &sheet.id);

            let mut name_right = download_rect.left() - theme::SPACING_SM;
            if self.session.prefs.is_favorite(&sheet.id) {
                painter.text(
                    egui::pos2(name_right, rect.center().y),
                    egui::Align2::RIGHT_CENTER,
                    egui_phosphor::regular::HEART,
                    egui::FontId::proportional(12.0),
                    theme::FAVORITE,
                );
                name_right -= 18.0;
            }

            let name_rect = egui::Rect::from_min_max(
                egui::pos2(badge.right() + theme::SPACING_MD, rect.top()),
                egui::pos2(name_right, rect.bottom()),
            );
            painter.with_clip_rect(name_rect).text(
                name_rect.left_center(),
                egui::Align2::LEFT_CENTER,
                &sheet.name,
                egui::FontId::proportional(theme::FONT_BODY),
                if is_selected { theme::ACCENT_DARK } else { theme::TEXT_PRIMARY },
            );

            let download_color = if download_resp.hovered() {
                painter.rect_filled(download_rect, theme::RADIUS_DEFAULT, theme::BG_SURFACE);
                theme::BTN_DOWNLOAD
            } else {
                theme::TEXT_MUTED
            };
            painter.text(
                download_rect.center(),
                egui::Align2::CENTER_CENTER,
                egui_phosphor::regular::DOWNLOAD_SIMPLE,
                egui::FontId::proportional(14.0),
                download_color,
            );
        }

        if response.hovered() || download_resp.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        let mut action = None;
        if download_resp.on_hover_text("Download").clicked() {
            action = Some(SheetAction::Download(sheet.id.clone()));
        } else if response.clicked() {
            action = Some(SheetAction::ShowOnMap(sheet.id.clone()));
        }
        response.context_menu(|ui| {
            if let Some(a) = self.sheet_context_menu(ui, sheet) {
                action = Some(a);
            }
        });
        action
    }

    fn render_empty_state(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(theme::SPACING_XL * 2.0);
            ui.label(
                egui::RichText::new(egui_phosphor::regular::MAP_TRIFOLD)
                    .size(36.0)
                    .color(theme::BORDER_DEFAULT),
            );
            ui.add_space(theme::SPACING_SM);
            let message = if self.session.favorites_only && self.session.query.trim().is_empty() {
                "No favorite sheets yet"
            } else {
                "No sheets match your search"
            };
            ui.label(egui::RichText::new(message).color(theme::TEXT_MUTED));
            ui.add_space(theme::SPACING_MD);
            if !self.session.query.is_empty() && ui.add(theme::button("Clear search")).clicked() {
                self.session.set_query("", &self.catalog);
            }
            if self.session.favorites_only && ui.add(theme::button("Show all sheets")).clicked() {
                self.session.set_favorites_only(false, &self.catalog);
            }
        });
    }

    fn render_sidebar_footer(&mut self, ui: &mut egui::Ui) {
        ui.separator();
        ui.horizontal(|ui| {
            ui.add(
                egui::Label::new(
                    egui::RichText::new(format!(
                        "{} of {} sheets",
                        self.session.filtered.len(),
                        self.catalog.len()
                    ))
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_MUTED),
                )
                .selectable(false),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let (rect, resp) = ui.allocate_exact_size(egui::vec2(24.0, 24.0), egui::Sense::click());
                let color = if resp.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                    ui.painter().rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_SURFACE);
                    theme::TEXT_PRIMARY
                } else {
                    theme::TEXT_MUTED
                };
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    egui_phosphor::regular::GEAR,
                    egui::FontId::proportional(16.0),
                    color,
                );
                if resp.on_hover_text("Settings").clicked() {
                    self.show_settings = true;
                }
                if let Some(source) = self.catalog.source_url() {
                    ui.hyperlink_to(
                        egui::RichText::new(format!("{} Source", egui_phosphor::regular::ARROW_SQUARE_OUT))
                            .size(theme::FONT_SMALL),
                        source,
                    );
                }
            });
        });
    }

    // ========================================================================
    // LIST VIEW
    // ========================================================================

    pub(crate) fn render_list_view(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let mut actions: Vec<SheetAction> = Vec::new();

        ui.horizontal(|ui| {
            ui.add(
                egui::Label::new(
                    egui::RichText::new(format!("{} sheets", self.session.filtered.len()))
                        .size(theme::FONT_HEADING)
                        .strong()
                        .color(theme::TEXT_PRIMARY),
                )
                .selectable(false),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let (icon, tip) = if self.compact_view {
                    (egui_phosphor::regular::SQUARES_FOUR, "Show cards")
                } else {
                    (egui_phosphor::regular::LIST, "Show table")
                };
                if ui.add(theme::button(icon)).on_hover_text(tip).clicked() {
                    self.compact_view = !self.compact_view;
                    self.save_settings();
                }
                ui.add_space(theme::SPACING_MD);
                let mut all = !self.session.favorites_only;
                if theme::segmented_toggle(ui, "All", "Favorites", &mut all) {
                    self.session.set_favorites_only(!all, &self.catalog);
                }
            });
        });
        ui.add_space(theme::SPACING_MD);

        if self.session.filtered.is_empty() {
            self.render_empty_state(ui);
        } else if self.compact_view {
            self.render_sheet_table(ui, &mut actions);
        } else {
            self.render_sheet_grid(ui, &mut actions);
        }

        for action in actions {
            self.apply_sheet_action(ctx, action);
        }
    }

    fn render_sheet_grid(&self, ui: &mut egui::Ui, actions: &mut Vec<SheetAction>) {
        let spacing = theme::SPACING_MD;
        let (base_w, card_h) = theme::CARD_SIZE;
        let available = ui.available_width();
        let num_cols = ((available + spacing) / (base_w + spacing)).floor().max(1.0);
        let card_w = ((available - spacing * (num_cols - 1.0)) / num_cols).floor();

        egui::ScrollArea::vertical()
            .id_salt("sheet_grid")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing = egui::vec2(spacing, spacing);
                    for &idx in &self.session.filtered {
                        if let Some(action) = self.sheet_card(ui, idx, egui::vec2(card_w, card_h)) {
                            actions.push(action);
                        }
                    }
                });
            });
    }

    fn sheet_card(&self, ui: &mut egui::Ui, idx: usize, size: egui::Vec2) -> Option<SheetAction> {
        let sheet = &self.catalog.sheets()[idx];
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
        let mut action = None;

        if ui.is_rect_visible(rect) {
            let is_selected = self.session.selected.as_deref() == Some(sheet.id.as_str());
            let stroke = if is_selected {
                egui::Stroke::new(theme::STROKE_REGION, theme::ACCENT)
            } else if response.hovered() {
                egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_DEFAULT)
            } else {
                egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_SUBTLE)
            };
            ui.painter().rect(
                rect,
                theme::RADIUS_LARGE,
                theme::BG_ELEVATED,
                stroke,
                egui::StrokeKind::Inside,
            );

            // Card content is laid out in a child ui so the card keeps its fixed size
            let mut content = ui.new_child(
                egui::UiBuilder::new()
                    .max_rect(rect.shrink(theme::SPACING_LG))
                    .layout(egui::Layout::top_down(egui::Align::Min)),
            );
            let ui = &mut content;

            ui.horizontal(|ui| {
                components::sheet_badge(ui, &sheet.id);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if components::favorite_toggle(ui, self.session.prefs.is_favorite(&sheet.id), 22.0).clicked() {
                        action = Some(SheetAction::ToggleFavorite(sheet.id.clone()));
                    }
                });
            });
            ui.add_space(theme::SPACING_SM);
            ui.add(
                egui::Label::new(
                    egui::RichText::new(&sheet.name)
                        .size(theme::FONT_BODY)
                        .strong()
                        .color(theme::TEXT_PRIMARY),
                )
                .selectable(false)
                .truncate(),
            );
            match &sheet.name_ar {
                Some(name_ar) => {
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(name_ar)
                                .size(theme::FONT_LABEL)
                                .color(theme::TEXT_MUTED),
                        )
                        .selectable(false)
                        .truncate(),
                    );
                }
                None => {
                    ui.add_space(theme::FONT_LABEL + 4.0);
                }
            }
            components::download_count_label(ui, self.session.prefs.download_count(&sheet.id));

            ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                ui.horizontal(|ui| {
                    if ui
                        .add(theme::button_download(format!(
                            "{} Download",
                            egui_phosphor::regular::DOWNLOAD_SIMPLE
                        )))
                        .clicked()
                    {
                        action = Some(SheetAction::Download(sheet.id.clone()));
                    }
                    if ui
                        .add(theme::button(format!("{} Show on map", egui_phosphor::regular::MAP_PIN)))
                        .clicked()
                    {
                        action = Some(SheetAction::ShowOnMap(sheet.id.clone()));
                    }
                });
            });
        }

        if action.is_none() && response.double_clicked() {
            action = Some(SheetAction::ShowOnMap(sheet.id.clone()));
        } else if action.is_none() && response.clicked() {
            action = Some(SheetAction::Select(sheet.id.clone()));
        }
        response.context_menu(|ui| {
            if let Some(a) = self.sheet_context_menu(ui, sheet) {
                action = Some(a);
            }
        });
        action
    }

    fn render_sheet_table(&self, ui: &mut egui::Ui, actions: &mut Vec<SheetAction>) {
        use egui_extras::{Column, TableBuilder};

        let row_height = 29.0;
        let header_height = 32.0;
        let available_width = ui.available_width();
        let selected = self.session.selected.as_deref();

        TableBuilder::new(ui)
            .id_salt("sheet_table")
            .striped(true)
            .resizable(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .sense(egui::Sense::click())
            .min_scrolled_height(0.0)
            .column(Column::exact(90.0))
            .column(Column::exact((available_width * 0.3).max(120.0)).clip(true))
            .column(Column::remainder().clip(true))
            .column(Column::exact(90.0))
            .column(Column::exact(36.0))
            .column(Column::exact(36.0))
            .header(header_height, |mut header| {
                for title in ["ID", "NAME", "ARABIC", "DOWNLOADS", "", ""] {
                    header.col(|ui| {
                        ui.add(
                            egui::Label::new(
                                egui::RichText::new(title)
                                    .size(theme::FONT_SMALL)
                                    .strong()
                                    .color(theme::TEXT_MUTED),
                            )
                            .selectable(false),
                        );
                    });
                }
            })
            .body(|body| {
                body.rows(row_height, self.session.filtered.len(), |mut row| {
                    let idx = self.session.filtered[row.index()];
                    let sheet = &self.catalog.sheets()[idx];
                    let mut action = None;
                    row.set_selected(selected == Some(sheet.id.as_str()));

                    row.col(|ui| {
                        components::sheet_badge(ui, &sheet.id);
                    });
                    row.col(|ui| {
                        ui.add(
                            egui::Label::new(egui::RichText::new(&sheet.name).color(theme::TEXT_PRIMARY))
                                .selectable(false)
                                .truncate(),
                        );
                    });
                    row.col(|ui| {
                        if let Some(name_ar) = &sheet.name_ar {
                            ui.add(
                                egui::Label::new(egui::RichText::new(name_ar).color(theme::TEXT_SECONDARY))
                                    .selectable(false)
                                    .truncate(),
                            );
                        }
                    });
                    row.col(|ui| {
                        let count = self.session.prefs.download_count(&sheet.id);
                        ui.add(
                            egui::Label::new(
                                egui::RichText::new(count.to_string())
                                    .size(theme::FONT_LABEL)
                                    .color(theme::TEXT_MUTED),
                            )
                            .selectable(false),
                        );
                    });
                    row.col(|ui| {
                        if components::favorite_toggle(ui, self.session.prefs.is_favorite(&sheet.id), 20.0).clicked() {
                            action = Some(SheetAction::ToggleFavorite(sheet.id.clone()));
                        }
                    });
                    row.col(|ui| {
                        let resp = ui
                            .add(
                                egui::Button::new(
                                    egui::RichText::new(egui_phosphor::regular::DOWNLOAD_SIMPLE)
                                        .color(theme::BTN_DOWNLOAD),
                                )
                                .frame(false),
                            )
                            .on_hover_text("Download");
                        if resp.clicked() {
                            action = Some(SheetAction::Download(sheet.id.clone()));
                        }
                    });

                    let response = row.response();
                    if action.is_none() && response.double_clicked() {
                        action = Some(SheetAction::ShowOnMap(sheet.id.clone()));
                    } else if action.is_none() && response.clicked() {
                        action = Some(SheetAction::Select(sheet.id.clone()));
                    }
                    response.context_menu(|ui| {
                        if let Some(a) = self.sheet_context_menu(ui, sheet) {
                            action = Some(a);
                        }
                    });
                    actions.extend(action);
                });
            });
    }
}
