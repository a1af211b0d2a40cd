//! App module - contains the main application state and logic

mod context_menu;
mod downloads;
pub(crate) mod filters;
mod map_view;
mod modals;
mod raster;
mod views;

pub(crate) use context_menu::SheetAction;
pub(crate) use raster::{resolve_locator, RasterState};

use crate::catalog::Catalog;
use crate::session::Session;
use crate::settings::Settings;
use crate::theme;
use crate::types::ViewMode;
use crate::utils;
use crate::viewport::Gesture;
use eframe::egui;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) catalog: Catalog,
    pub(crate) session: Session,
    /// False when preferences live in memory only
    pub(crate) prefs_persistent: bool,
    pub(crate) focus_search: bool,
    pub(crate) logo_texture: Option<egui::TextureHandle>,
    // Map view
    pub(crate) gesture: Gesture,
    pub(crate) hovered: Option<usize>,
    /// Sheet under the pointer when the map context menu opened
    pub(crate) menu_sheet: Option<usize>,
    pub(crate) quick_search_open: bool,
    pub(crate) quick_search_query: String,
    pub(crate) focus_quick_search: bool,
    // Index raster
    pub(crate) raster: RasterState,
    pub(crate) raster_locator: String,
    pub(crate) runtime: Option<tokio::runtime::Runtime>,
    // View
    pub(crate) view_mode: ViewMode,
    pub(crate) compact_view: bool,
    pub(crate) show_source_toast: bool,
    pub(crate) show_settings: bool,
    pub(crate) settings_draft: SettingsDraft,
    // Toast notification
    pub(crate) toast_message: Option<String>,
    pub(crate) toast_start: Option<Instant>,
    // Window
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) data_dir: PathBuf,
}

/// Editable copy of the source overrides shown in the settings window
#[derive(Debug, Clone, Default)]
pub(crate) struct SettingsDraft {
    pub catalog_path: String,
    pub raster_url: String,
    pub font_path: String,
}

impl SettingsDraft {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            catalog_path: settings.catalog_path.clone().unwrap_or_default(),
            raster_url: settings.raster_url.clone().unwrap_or_default(),
            font_path: settings.font_path.clone().unwrap_or_default(),
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Everything `App::new` needs from startup
pub struct AppInit {
    pub catalog: Catalog,
    pub session: Session,
    pub prefs_persistent: bool,
    pub settings: Settings,
    pub raster_locator: String,
    pub runtime: Option<tokio::runtime::Runtime>,
    pub data_dir: PathBuf,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, init: AppInit) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Light);

        // Phosphor icons plus an optional user font for Arabic names
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        if let Some(path) = init.settings.font_path() {
            match std::fs::read(&path) {
                Ok(bytes) => {
                    fonts.font_data.insert(
                        "extra".to_owned(),
                        std::sync::Arc::new(egui::FontData::from_owned(bytes)),
                    );
                    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
                        if let Some(list) = fonts.families.get_mut(&family) {
                            list.push("extra".to_owned());
                        }
                    }
                    info!(path = %path.display(), "Extra font loaded");
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to read extra font"),
            }
        }
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let logo_texture = utils::rasterize_logo((theme::LOGO_SIZE * 2.5) as u32).map(|(pixels, w, h)| {
            cc.egui_ctx.load_texture(
                "logo",
                egui::ColorImage::from_rgba_unmultiplied([w as usize, h as usize], &pixels),
                egui::TextureOptions::LINEAR,
            )
        });

        let AppInit {
            catalog,
            session,
            prefs_persistent,
            settings,
            raster_locator,
            runtime,
            data_dir,
        } = init;

        Self {
            catalog,
            session,
            prefs_persistent,
            focus_search: false,
            logo_texture,
            gesture: Gesture::default(),
            hovered: None,
            menu_sheet: None,
            quick_search_open: false,
            quick_search_query: String::new(),
            focus_quick_search: false,
            raster: RasterState::NotStarted,
            raster_locator,
            runtime,
            view_mode: settings.view_mode,
            compact_view: settings.compact_view,
            show_source_toast: settings.show_source_toast,
            show_settings: false,
            settings_draft: SettingsDraft::from_settings(&settings),
            toast_message: None,
            toast_start: None,
            window_pos: None,
            window_size: None,
            needs_center: settings.window_x.is_none(),
            data_dir,
        }
    }

    pub fn save_settings(&self) {
        let settings = Settings {
            window_x: self.window_pos.map(|p| p.x),
            window_y: self.window_pos.map(|p| p.y),
            window_w: self.window_size.map(|s| s.x),
            window_h: self.window_size.map(|s| s.y),
            view_mode: self.view_mode,
            compact_view: self.compact_view,
            show_source_toast: self.show_source_toast,
            catalog_path: optional(&self.settings_draft.catalog_path),
            raster_url: optional(&self.settings_draft.raster_url),
            font_path: optional(&self.settings_draft.font_path),
        };
        settings.save(&self.data_dir);
    }

    /// Short-lived message at the bottom of the window
    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast_message = Some(message.into());
        self.toast_start = Some(Instant::now());
    }

    /// Select a sheet and bring the map to the front
    pub fn show_on_map(&mut self, id: &str) {
        self.session.select(id, &self.catalog);
        self.view_mode = ViewMode::Map;
    }

    pub fn catalog_title(&self) -> &str {
        self.catalog.title().unwrap_or(crate::constants::APP_NAME)
    }
}
