#![windows_subsystem = "windows"]
//! Topo Sheet Index - Main entry point

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;
mod catalog;
mod constants;
mod db;
mod geometry;
mod prefs;
mod session;
mod settings;
mod theme;
mod types;
mod ui;
mod utils;
mod viewport;

use app::{resolve_locator, App, AppInit};
use catalog::Catalog;
use constants::*;
use db::Database;
use eframe::egui;
use prefs::{KeyValueStore, MemoryStore, Preferences};
use session::Session;
use settings::Settings;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use types::ViewMode;

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "topo-sheet-index.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,topo_sheet_index=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

/// Open the preference database, falling back to a process-local store.
/// Returns the store and whether it survives a restart.
fn open_store(db_path: &Path) -> (Box<dyn KeyValueStore>, bool) {
    match Database::open(db_path) {
        Ok(db) => {
            info!(path = %db_path.display(), "Database opened");
            (Box::new(db), true)
        }
        Err(e) => {
            error!(error = %e, path = %db_path.display(), "Failed to open database, preferences will not be saved");
            (Box::new(MemoryStore::default()), false)
        }
    }
}

fn main() -> eframe::Result<()> {
    let data_dir = utils::get_data_dir();
    std::fs::create_dir_all(&data_dir).ok();

    // Initialize logging - guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "Topo Sheet Index starting");

    let settings = Settings::load(&data_dir);

    // Env var first, then the configured file, then the embedded copy
    let candidates = std::env::var_os(CATALOG_ENV)
        .map(PathBuf::from)
        .into_iter()
        .chain(settings.catalog_path());
    let catalog = match Catalog::load_first(candidates) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!(error = %e, "No usable catalog");
            return Err(eframe::Error::AppCreation(Box::new(e)));
        }
    };

    info!(version = catalog.version(), sheets = catalog.len(), "Catalog ready");
    if catalog.is_empty() {
        warn!("Catalog lists no sheets");
    }

    let (store, prefs_persistent) = open_store(&data_dir.join("index.db"));
    let prefs = Preferences::load(store);
    info!(
        favorites = prefs.favorites().len(),
        downloads = prefs.total_downloads(),
        "Preferences loaded"
    );
    let session = Session::new(&catalog, prefs);

    let raster_locator = resolve_locator(
        std::env::var(RASTER_ENV).ok(),
        settings.raster_override(),
        catalog.raster_url(),
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("raster-loader")
        .enable_all()
        .build()
    {
        Ok(rt) => Some(rt),
        Err(e) => {
            error!(error = %e, "Failed to start async runtime");
            None
        }
    };

    // Load saved window position/size
    let win_pos = match (settings.window_x, settings.window_y) {
        (Some(x), Some(y)) => Some(egui::pos2(x, y)),
        _ => None,
    };
    let win_size = match (settings.window_w, settings.window_h) {
        (Some(w), Some(h)) => Some(egui::vec2(w, h)),
        _ => None,
    };

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(win_size.unwrap_or(egui::vec2(1280.0, 800.0)))
        .with_min_inner_size([900.0, 600.0])
        .with_title(APP_NAME);

    if let Some((rgba, width, height)) = utils::rasterize_logo_square(256) {
        viewport = viewport.with_icon(std::sync::Arc::new(egui::IconData { rgba, width, height }));
    }
    if let Some(pos) = win_pos {
        viewport = viewport.with_position(pos);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let init = AppInit {
        catalog,
        session,
        prefs_persistent,
        settings,
        raster_locator,
        runtime,
        data_dir,
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, init)))),
    )
}

// ============================================================================
// MAIN UPDATE LOOP
// ============================================================================

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window position/size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                self.window_pos = Some(rect.min);
            }
            if let Some(rect) = i.viewport().inner_rect {
                self.window_size = Some(rect.size());
            }
        });

        // Start loading the index image on first frame
        if matches!(self.raster, app::RasterState::NotStarted) {
            self.start_raster_load(ctx);
        }

        // Center window on first launch
        if self.needs_center {
            self.needs_center = false;
            if let Some(cmd) = egui::ViewportCommand::center_on_screen(ctx) {
                ctx.send_viewport_cmd(cmd);
            }
        }

        self.poll_raster(ctx);
        self.handle_global_keys(ctx);

        // Sidebar must be added before the central panel
        self.render_sidebar(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(theme::BG_BASE).inner_margin(match self.view_mode {
                ViewMode::Map => egui::Margin::ZERO,
                ViewMode::List => egui::Margin::same(theme::SPACING_XL as i8),
            }))
            .show(ctx, |ui| match self.view_mode {
                ViewMode::Map => self.render_map_view(ui, ctx),
                ViewMode::List => self.render_list_view(ui, ctx),
            });

        self.render_settings_modal(ctx);
        self.render_toast(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application shutting down");
        self.save_settings();
    }
}

impl App {
    /// Type-anywhere search, Escape, and Ctrl+F for the map lookup
    fn handle_global_keys(&mut self, ctx: &egui::Context) {
        let (escape, find) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Escape),
                i.modifiers.command && i.key_pressed(egui::Key::F),
            )
        });

        if escape {
            match escape_target(self.quick_search_open, self.show_settings, ctx.wants_keyboard_input()) {
                EscapeTarget::QuickSearch => self.close_quick_search(),
                EscapeTarget::Selection => self.session.clear_selection(),
                EscapeTarget::Nothing => {}
            }
        }
        if find && self.view_mode == ViewMode::Map {
            self.open_quick_search();
            return;
        }

        if self.show_settings || ctx.wants_keyboard_input() {
            return;
        }
        let mut typed_text = String::new();
        let mut backspace = false;
        ctx.input(|i| {
            for event in &i.events {
                match event {
                    egui::Event::Text(text) if !text.is_empty() && !text.chars().any(char::is_control) => {
                        typed_text.push_str(text);
                    }
                    egui::Event::Key {
                        key: egui::Key::Backspace,
                        pressed: true,
                        ..
                    } => backspace = true,
                    _ => {}
                }
            }
        });
        if !typed_text.is_empty() {
            self.session.query.push_str(&typed_text);
            self.focus_search = true;
            self.apply_filters();
        }
        if backspace && !self.session.query.is_empty() {
            self.session.query.pop();
            self.focus_search = true;
            self.apply_filters();
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum EscapeTarget {
    QuickSearch,
    Selection,
    Nothing,
}

/// What Escape dismisses. A focused text field or the settings dialog
/// keeps it for themselves.
fn escape_target(quick_search_open: bool, settings_open: bool, text_focused: bool) -> EscapeTarget {
    if quick_search_open {
        EscapeTarget::QuickSearch
    } else if settings_open || text_focused {
        EscapeTarget::Nothing
    } else {
        EscapeTarget::Selection
    }
}
