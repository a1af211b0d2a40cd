//! Reusable UI components
//!
//! Small widgets shared by the sidebar, the map overlays and the list view.

use crate::theme;
use eframe::egui;

/// Paint a sheet id pill with its left edge at `left_center`; returns its rect
pub fn paint_sheet_badge(painter: &egui::Painter, left_center: egui::Pos2, id: &str) -> egui::Rect {
    let galley = painter.layout_no_wrap(
        id.to_string(),
        egui::FontId::monospace(theme::FONT_SMALL),
        theme::TEXT_ON_ACCENT,
    );
    let size = egui::vec2(galley.size().x + 12.0, theme::BADGE_HEIGHT);
    let rect = egui::Rect::from_min_size(left_center - egui::vec2(0.0, size.y / 2.0), size);
    painter.rect_filled(rect, theme::RADIUS_DEFAULT, theme::ACCENT);
    painter.galley(rect.center() - galley.size() / 2.0, galley, theme::TEXT_ON_ACCENT);
    rect
}

/// Sheet id as a laid-out widget
pub fn sheet_badge(ui: &mut egui::Ui, id: &str) -> egui::Response {
    let width = ui.fonts(|f| {
        f.layout_no_wrap(
            id.to_string(),
            egui::FontId::monospace(theme::FONT_SMALL),
            theme::TEXT_ON_ACCENT,
        )
        .size()
        .x
    });
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(width + 12.0, theme::BADGE_HEIGHT), egui::Sense::hover());
    if ui.is_rect_visible(rect) {
        paint_sheet_badge(ui.painter(), rect.left_center(), id);
    }
    response
}

/// Heart toggle; returns a clicked response when the state should flip
pub fn favorite_toggle(ui: &mut egui::Ui, is_favorite: bool, size: f32) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click());

    if ui.is_rect_visible(rect) {
        let color = if is_favorite || response.hovered() {
            theme::FAVORITE
        } else {
            theme::FAVORITE_EMPTY
        };
        if is_favorite {
            ui.painter().circle_filled(rect.center(), size / 2.0, theme::BG_HOVER);
        }
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            egui_phosphor::regular::HEART,
            egui::FontId::proportional(size * 0.75),
            color,
        );
    }
    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }

    response.on_hover_text(if is_favorite {
        "Remove from favorites"
    } else {
        "Add to favorites"
    })
}

/// "3 downloads" caption, omitted for sheets never downloaded
pub fn download_count_label(ui: &mut egui::Ui, count: u64) {
    if count == 0 {
        return;
    }
    let text = if count == 1 {
        format!("{} 1 download", egui_phosphor::regular::DOWNLOAD_SIMPLE)
    } else {
        format!("{} {} downloads", egui_phosphor::regular::DOWNLOAD_SIMPLE, count)
    };
    ui.add(
        egui::Label::new(
            egui::RichText::new(text)
                .size(theme::FONT_SMALL)
                .color(theme::TEXT_MUTED),
        )
        .selectable(false),
    );
}
