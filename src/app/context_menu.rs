//! Shared context menu for sheets (sidebar rows, list cards, table rows, map regions)

use super::App;
use crate::catalog::MapSheet;
use crate::theme;
use eframe::egui;
use tracing::debug;

/// Something the user asked to do with a sheet. Views collect these while
/// drawing and `App::apply_sheet_action` runs them afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SheetAction {
    Select(String),
    ShowOnMap(String),
    Download(String),
    ToggleFavorite(String),
    CopyId(String),
    CopyLink(String),
}

impl App {
    pub(crate) fn sheet_context_menu(&self, ui: &mut egui::Ui, sheet: &MapSheet) -> Option<SheetAction> {
        ui.spacing_mut().item_spacing.y = 2.0;
        let favorite_label = if self.session.prefs.is_favorite(&sheet.id) {
            "Remove favorite"
        } else {
            "Add to favorites"
        };

        let labels = [
            format!("{}  Show on map", egui_phosphor::regular::MAP_PIN),
            format!("{}  Download", egui_phosphor::regular::DOWNLOAD_SIMPLE),
            format!("{}  {}", egui_phosphor::regular::HEART, favorite_label),
            format!("{}  Copy sheet id", egui_phosphor::regular::COPY),
            format!("{}  Copy download link", egui_phosphor::regular::LINK),
        ];
        let label_refs: Vec<&str> = labels.iter().map(|s| s.as_str()).collect();
        theme::set_menu_width(ui, &label_refs);

        let mut action = None;
        if theme::menu_item(ui, egui_phosphor::regular::MAP_PIN, "Show on map") {
            action = Some(SheetAction::ShowOnMap(sheet.id.clone()));
        }
        if theme::menu_item(ui, egui_phosphor::regular::DOWNLOAD_SIMPLE, "Download") {
            action = Some(SheetAction::Download(sheet.id.clone()));
        }
        if theme::menu_item(ui, egui_phosphor::regular::HEART, favorite_label) {
            action = Some(SheetAction::ToggleFavorite(sheet.id.clone()));
        }
        ui.separator();
        if theme::menu_item(ui, egui_phosphor::regular::COPY, "Copy sheet id") {
            action = Some(SheetAction::CopyId(sheet.id.clone()));
        }
        if theme::menu_item(ui, egui_phosphor::regular::LINK, "Copy download link") {
            action = Some(SheetAction::CopyLink(sheet.id.clone()));
        }

        if action.is_some() {
            ui.close_menu();
        }
        action
    }

    pub(crate) fn apply_sheet_action(&mut self, ctx: &egui::Context, action: SheetAction) {
        debug!(?action, "Sheet action");
        match action {
            SheetAction::Select(id) => self.session.select(&id, &self.catalog),
            SheetAction::ShowOnMap(id) => self.show_on_map(&id),
            SheetAction::Download(id) => self.download_sheet(&id),
            SheetAction::ToggleFavorite(id) => {
                self.session.toggle_favorite(&id, &self.catalog);
            }
            SheetAction::CopyId(id) => {
                ctx.copy_text(id.clone());
                self.show_toast(format!("Copied {id}"));
            }
            SheetAction::CopyLink(id) => {
                if let Some(sheet) = self.catalog.get(&id) {
                    ctx.copy_text(sheet.href.clone());
                    self.show_toast("Download link copied");
                }
            }
        }
    }
}
