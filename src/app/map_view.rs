//! Map canvas: index raster, sheet overlay, pan/zoom input and floating tools

use super::filters::quick_search;
use super::{App, RasterState, SheetAction};
use crate::constants::ZOOM_STEP;
use crate::geometry::Shape as RegionShape;
use crate::theme;
use crate::ui::components;
use crate::utils::{format_bytes, format_percent};
use eframe::egui;
use std::time::Duration;

/// What the canvas shows besides (or instead of) the raster
enum CanvasStatus {
    Ready(egui::TextureId),
    Loading { fraction: Option<f32>, received: u64 },
    Failed(String),
}

fn toolbar_button(ui: &mut egui::Ui, icon: &str, tooltip: &str, enabled: bool) -> bool {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(28.0, 28.0), egui::Sense::click());
    let (fill, draw_rect) = if enabled {
        theme::button_visual(&response, theme::BG_ELEVATED, rect)
    } else {
        (theme::BG_ELEVATED, rect)
    };
    ui.painter().rect_filled(draw_rect, theme::RADIUS_DEFAULT, fill);
    ui.painter().text(
        draw_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(14.0),
        if enabled { theme::TEXT_PRIMARY } else { theme::BORDER_DEFAULT },
    );
    if enabled && response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
    enabled && response.on_hover_text(tooltip).clicked()
}

impl App {
    pub(crate) fn render_map_view(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        self.session.viewport.measure_container(rect.size());

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, theme::BG_CANVAS);

        let status = match &self.raster {
            RasterState::Ready(texture) => CanvasStatus::Ready(texture.id()),
            RasterState::Loading { progress, .. } => CanvasStatus::Loading {
                fraction: progress.fraction(),
                received: progress.received(),
            },
            RasterState::NotStarted => CanvasStatus::Loading {
                fraction: None,
                received: 0,
            },
            RasterState::Failed(msg) => CanvasStatus::Failed(msg.clone()),
        };

        let mut actions = Vec::new();
        match status {
            CanvasStatus::Ready(texture_id) => {
                if let Some(img_rect) = self.session.viewport.raster_rect(rect) {
                    painter.image(
                        texture_id,
                        img_rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }
                self.handle_canvas_input(ui, &response, rect);
                self.paint_regions(&painter, rect);
                self.show_hover_tooltip(ui);
                actions.extend(self.canvas_click(&response, rect));
            }
            CanvasStatus::Loading { fraction, received } => {
                paint_loading(&painter, rect, fraction, received);
                ctx.request_repaint_after(Duration::from_millis(250));
            }
            CanvasStatus::Failed(msg) => paint_failed(&painter, rect, &msg),
        }

        self.render_map_toolbar(ctx, rect);
        self.render_hint_bar(ctx, rect);
        if let Some(action) = self.render_quick_search(ctx, rect) {
            actions.push(action);
        }
        if let Some(action) = self.render_selected_card(ctx, rect) {
            actions.push(action);
        }
        self.render_source_toast(ctx, rect);

        for action in actions {
            self.apply_sheet_action(ctx, action);
        }
    }

    /// Pan from pointer drags, zoom from wheel and pinch, hover from position.
    /// Release is read from the global pointer state so a drag that ends
    /// outside the canvas still stops.
    fn handle_canvas_input(&mut self, ui: &egui::Ui, response: &egui::Response, rect: egui::Rect) {
        let (pressed, down, released, pointer) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.any_released(),
                i.pointer.interact_pos(),
            )
        });

        let pressed_inside = pressed && response.hovered();
        if let Some(delta) = self.gesture.on_pointer(pressed_inside, down && !released, pointer) {
            self.session.viewport.apply_pan(delta);
        }

        if response.hovered() {
            // Consume the wheel so nothing behind the canvas scrolls
            let (scroll, pinch) = ui.ctx().input_mut(|i| {
                let scroll = i.raw_scroll_delta.y;
                i.raw_scroll_delta = egui::Vec2::ZERO;
                i.smooth_scroll_delta = egui::Vec2::ZERO;
                (scroll, i.zoom_delta())
            });
            // egui reports wheel-down as negative, the zoom rule expects positive
            self.session.viewport.apply_zoom(-scroll);
            self.session.viewport.apply_pinch(pinch);
        }

        self.hovered = if self.gesture.is_dragging() || !response.hovered() {
            None
        } else {
            ui.input(|i| i.pointer.hover_pos())
                .and_then(|pos| self.session.viewport.hit_test(&self.catalog, pos, rect))
                .and_then(|sheet| self.catalog.index_of(&sheet.id))
        };

        let cursor = if self.gesture.is_dragging() {
            Some(egui::CursorIcon::Grabbing)
        } else if self.hovered.is_some() {
            Some(egui::CursorIcon::PointingHand)
        } else if response.hovered() {
            Some(egui::CursorIcon::Grab)
        } else {
            None
        };
        if let Some(cursor) = cursor {
            ui.ctx().set_cursor_icon(cursor);
        }
    }

    /// Regions are invisible until hovered or selected
    fn paint_regions(&self, painter: &egui::Painter, rect: egui::Rect) {
        let selected = self
            .session
            .selected
            .as_deref()
            .and_then(|id| self.catalog.index_of(id));
        let hovered = self.hovered.filter(|&h| Some(h) != selected);

        for (idx, is_selected) in [(hovered, false), (selected, true)]
            .into_iter()
            .filter_map(|(idx, sel)| idx.map(|i| (i, sel)))
        {
            let Some(region) = self.catalog.sheets()[idx].geometry.as_ref() else {
                continue;
            };
            let (fill, stroke_color) = if is_selected {
                (theme::ACCENT_FILL, theme::ACCENT)
            } else {
                (theme::HOVER_FILL, theme::ACCENT_DARK)
            };
            let stroke = egui::Stroke::new(theme::STROKE_REGION, stroke_color);
            let points: Vec<egui::Pos2> = region
                .points()
                .iter()
                .filter_map(|p| self.session.viewport.raster_to_screen(*p, rect))
                .collect();

            match (region.shape(), points.as_slice()) {
                (RegionShape::Rectangle, [a, b]) => {
                    painter.rect(
                        egui::Rect::from_two_pos(*a, *b),
                        0.0,
                        fill,
                        stroke,
                        egui::StrokeKind::Middle,
                    );
                }
                (RegionShape::Polygon, pts) if pts.len() >= 3 => {
                    painter.add(polygon_shape(pts.to_vec(), region.is_convex(), fill, stroke));
                }
                _ => {}
            }
        }
    }

    fn show_hover_tooltip(&self, ui: &egui::Ui) {
        let Some(sheet) = self.hovered.map(|idx| &self.catalog.sheets()[idx]) else {
            return;
        };
        egui::show_tooltip_at_pointer(
            ui.ctx(),
            ui.layer_id(),
            egui::Id::new("sheet_tooltip"),
            |ui| {
                ui.horizontal(|ui| {
                    components::sheet_badge(ui, &sheet.id);
                    ui.label(egui::RichText::new(&sheet.title).color(theme::TEXT_PRIMARY));
                });
                if let Some(name_ar) = &sheet.name_ar {
                    ui.label(egui::RichText::new(name_ar).color(theme::TEXT_MUTED));
                }
            },
        );
    }

    /// Left click selects the sheet under the pointer; right click opens the
    /// sheet menu, or the view menu over empty map.
    fn canvas_click(&mut self, response: &egui::Response, rect: egui::Rect) -> Option<SheetAction> {
        let mut action = None;

        if response.clicked() {
            action = response
                .interact_pointer_pos()
                .and_then(|pos| self.session.viewport.hit_test(&self.catalog, pos, rect))
                .map(|sheet| SheetAction::Select(sheet.id.clone()));
        }
        if response.secondary_clicked() {
            self.menu_sheet = self.hovered;
        }

        let mut fit = false;
        let mut find = false;
        response.context_menu(|ui| match self.menu_sheet {
            Some(idx) => {
                if let Some(a) = self.sheet_context_menu(ui, &self.catalog.sheets()[idx]) {
                    action = Some(a);
                }
            }
            None => {
                theme::set_menu_width(ui, &["Fit to window", "Find a sheet"]);
                if theme::menu_item(ui, egui_phosphor::regular::CORNERS_IN, "Fit to window") {
                    fit = true;
                    ui.close_menu();
                }
                if theme::menu_item(ui, egui_phosphor::regular::MAGNIFYING_GLASS, "Find a sheet") {
                    find = true;
                    ui.close_menu();
                }
            }
        });

        if fit {
            self.session.viewport.reset_to_fit();
        }
        if find {
            self.open_quick_search();
        }
        action
    }

    fn render_map_toolbar(&mut self, ctx: &egui::Context, rect: egui::Rect) {
        let ready = self.session.viewport.is_ready();
        egui::Area::new(egui::Id::new("map_toolbar"))
            .fixed_pos(egui::pos2(rect.right() - theme::SPACING_LG, rect.top() + theme::SPACING_LG))
            .pivot(egui::Align2::RIGHT_TOP)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                theme::overlay_frame()
                    .inner_margin(theme::SPACING_SM)
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.spacing_mut().item_spacing.x = theme::SPACING_XS;
                            if toolbar_button(ui, egui_phosphor::regular::MAGNIFYING_GLASS, "Find a sheet (Ctrl+F)", true) {
                                if self.quick_search_open {
                                    self.close_quick_search();
                                } else {
                                    self.open_quick_search();
                                }
                            }
                            ui.separator();
                            if toolbar_button(ui, egui_phosphor::regular::MINUS, "Zoom out", ready) {
                                self.session.viewport.zoom_step(-ZOOM_STEP);
                            }
                            let (pct_rect, _) =
                                ui.allocate_exact_size(egui::vec2(44.0, 28.0), egui::Sense::hover());
                            ui.painter().text(
                                pct_rect.center(),
                                egui::Align2::CENTER_CENTER,
                                format_percent(self.session.viewport.scale()),
                                egui::FontId::proportional(12.0),
                                theme::TEXT_SECONDARY,
                            );
                            if toolbar_button(ui, egui_phosphor::regular::PLUS, "Zoom in", ready) {
                                self.session.viewport.zoom_step(ZOOM_STEP);
                            }
                            if toolbar_button(ui, egui_phosphor::regular::CORNERS_IN, "Fit to window", ready) {
                                self.session.viewport.reset_to_fit();
                            }
                        });
                    });
            });
    }

    fn render_hint_bar(&self, ctx: &egui::Context, rect: egui::Rect) {
        egui::Area::new(egui::Id::new("map_hint"))
            .fixed_pos(egui::pos2(rect.left() + theme::SPACING_LG, rect.bottom() - theme::SPACING_LG))
            .pivot(egui::Align2::LEFT_BOTTOM)
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                theme::overlay_frame()
                    .inner_margin(egui::Margin::symmetric(10, 4))
                    .show(ui, |ui| {
                        ui.add(
                            egui::Label::new(
                                egui::RichText::new(format!(
                                    "Drag to pan, scroll to zoom  |  {}",
                                    format_percent(self.session.viewport.scale())
                                ))
                                .size(theme::FONT_SMALL)
                                .color(theme::TEXT_MUTED),
                            )
                            .selectable(false)
                            .extend(),
                        );
                    });
            });
    }

    pub(crate) fn open_quick_search(&mut self) {
        self.quick_search_open = true;
        self.focus_quick_search = true;
    }

    pub(crate) fn close_quick_search(&mut self) {
        self.quick_search_open = false;
        self.quick_search_query.clear();
    }

    fn render_quick_search(&mut self, ctx: &egui::Context, rect: egui::Rect) -> Option<SheetAction> {
        if !self.quick_search_open {
            return None;
        }

        let mut picked: Option<String> = None;
        egui::Area::new(egui::Id::new("quick_search"))
            .fixed_pos(egui::pos2(rect.right() - theme::SPACING_LG, rect.top() + 60.0))
            .pivot(egui::Align2::RIGHT_TOP)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                theme::overlay_frame().show(ui, |ui| {
                    ui.set_width(theme::QUICK_SEARCH_WIDTH);
                    let input = ui.add(
                        egui::TextEdit::singleline(&mut self.quick_search_query)
                            .hint_text("Sheet name or number...")
                            .desired_width(f32::INFINITY),
                    );
                    if self.focus_quick_search {
                        self.focus_quick_search = false;
                        input.request_focus();
                    }

                    let results = quick_search(&self.quick_search_query, self.catalog.sheets());
                    let enter = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if enter {
                        picked = results
                            .first()
                            .map(|&idx| self.catalog.sheets()[idx].id.clone());
                    }

                    if results.is_empty() {
                        if !self.quick_search_query.trim().is_empty() {
                            ui.add_space(theme::SPACING_SM);
                            ui.label(
                                egui::RichText::new("No sheets found")
                                    .size(theme::FONT_LABEL)
                                    .color(theme::TEXT_MUTED),
                            );
                        }
                        return;
                    }

                    ui.add_space(theme::SPACING_SM);
                    for idx in results {
                        let sheet = &self.catalog.sheets()[idx];
                        let row = ui
                            .horizontal(|ui| {
                                components::sheet_badge(ui, &sheet.id);
                                ui.add(
                                    egui::Label::new(
                                        egui::RichText::new(&sheet.name).color(theme::TEXT_PRIMARY),
                                    )
                                    .selectable(false)
                                    .truncate(),
                                );
                            })
                            .response
                            .interact(egui::Sense::click());
                        if row.hovered() {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                            ui.painter().rect_stroke(
                                row.rect.expand(2.0),
                                theme::RADIUS_DEFAULT,
                                egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_DEFAULT),
                                egui::StrokeKind::Outside,
                            );
                        }
                        if row.clicked() {
                            picked = Some(sheet.id.clone());
                        }
                    }
                });
            });

        let id = picked?;
        self.close_quick_search();
        Some(SheetAction::ShowOnMap(id))
    }
}

/// Fan fill is only correct for convex rings; concave ones get their outline.
fn polygon_shape(points: Vec<egui::Pos2>, convex: bool, fill: egui::Color32, stroke: egui::Stroke) -> egui::Shape {
    if convex {
        egui::Shape::convex_polygon(points, fill, stroke)
    } else {
        egui::Shape::closed_line(points, stroke)
    }
}

fn paint_loading(painter: &egui::Painter, rect: egui::Rect, fraction: Option<f32>, received: u64) {
    let label = match (fraction, received) {
        (Some(f), _) => format!("Loading index image... {}", format_percent(f)),
        (None, 0) => "Loading index image...".to_string(),
        (None, bytes) => format!("Loading index image... {}", format_bytes(bytes)),
    };
    painter.text(
        rect.center() - egui::vec2(0.0, 12.0),
        egui::Align2::CENTER_CENTER,
        label,
        egui::FontId::proportional(theme::FONT_BODY),
        theme::TEXT_MUTED,
    );
    if let Some(f) = fraction {
        let bar = egui::Rect::from_center_size(rect.center() + egui::vec2(0.0, 12.0), egui::vec2(200.0, 4.0));
        painter.rect_filled(bar, theme::RADIUS_SMALL, theme::BORDER_DEFAULT);
        let mut done = bar;
        done.set_width(bar.width() * f.clamp(0.0, 1.0));
        painter.rect_filled(done, theme::RADIUS_SMALL, theme::ACCENT);
    }
}

fn paint_failed(painter: &egui::Painter, rect: egui::Rect, msg: &str) {
    painter.text(
        rect.center() - egui::vec2(0.0, 36.0),
        egui::Align2::CENTER_CENTER,
        egui_phosphor::regular::IMAGE_BROKEN,
        egui::FontId::proportional(48.0),
        theme::BORDER_DEFAULT,
    );
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "Index image unavailable",
        egui::FontId::proportional(theme::FONT_HEADING),
        theme::TEXT_SECONDARY,
    );
    painter.text(
        rect.center() + egui::vec2(0.0, 22.0),
        egui::Align2::CENTER_CENTER,
        msg,
        egui::FontId::proportional(theme::FONT_SMALL),
        theme::TEXT_MUTED,
    );
    painter.text(
        rect.center() + egui::vec2(0.0, 44.0),
        egui::Align2::CENTER_CENTER,
        "Search and the sheet list still work",
        egui::FontId::proportional(theme::FONT_SMALL),
        theme::TEXT_MUTED,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Region;
    use egui::pos2;

    fn path(shape: egui::Shape) -> egui::epaint::PathShape {
        match shape {
            egui::Shape::Path(path) => path,
            other => panic!("expected a path, got {other:?}"),
        }
    }

    #[test]
    fn concave_region_is_outlined_not_filled() {
        let ring = vec![
            pos2(0.0, 0.0),
            pos2(3.0, 0.0),
            pos2(3.0, 8.0),
            pos2(7.0, 8.0),
            pos2(7.0, 0.0),
            pos2(10.0, 0.0),
            pos2(10.0, 10.0),
            pos2(0.0, 10.0),
        ];
        let region = Region::polygon(ring.clone());
        let stroke = egui::Stroke::new(2.0, theme::ACCENT);

        let shape = path(polygon_shape(ring, region.is_convex(), theme::ACCENT_FILL, stroke));
        assert!(shape.closed);
        assert_eq!(shape.fill, egui::Color32::TRANSPARENT);
        assert_eq!(shape.points.len(), 8);
    }

    #[test]
    fn convex_region_is_filled() {
        let ring = vec![pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(10.0, 10.0), pos2(0.0, 10.0)];
        let region = Region::polygon(ring.clone());
        let stroke = egui::Stroke::new(2.0, theme::ACCENT);

        let shape = path(polygon_shape(ring, region.is_convex(), theme::ACCENT_FILL, stroke));
        assert_eq!(shape.fill, theme::ACCENT_FILL);
    }
}
