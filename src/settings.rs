//! User settings stored as settings.json in the app data directory

use crate::types::ViewMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    // View
    pub view_mode: ViewMode,
    pub compact_view: bool,
    pub show_source_toast: bool,

    // Sources
    pub catalog_path: Option<String>,
    pub raster_url: Option<String>,

    /// Extra font appended to the fallback chain, e.g. for Arabic names
    pub font_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_x: None,
            window_y: None,
            window_w: None,
            window_h: None,
            view_mode: ViewMode::Map,
            compact_view: false,
            show_source_toast: true,
            catalog_path: None,
            raster_url: None,
            font_path: None,
        }
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    /// Catalog file to load instead of the embedded one. Blank entries count
    /// as unset.
    pub fn catalog_path(&self) -> Option<PathBuf> {
        non_blank(&self.catalog_path).map(PathBuf::from)
    }

    pub fn raster_override(&self) -> Option<&str> {
        non_blank(&self.raster_url)
    }

    pub fn font_path(&self) -> Option<PathBuf> {
        non_blank(&self.font_path).map(PathBuf::from)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            window_w: Some(1280.0),
            view_mode: ViewMode::List,
            compact_view: true,
            raster_url: Some("/tmp/index.png".into()),
            ..Settings::default()
        };
        settings.save(dir.path());
        assert_eq!(Settings::load(dir.path()), settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), r#"{ "view_mode": "list" }"#).unwrap();
        let settings = Settings::load(dir.path());
        assert_eq!(settings.view_mode, ViewMode::List);
        assert!(settings.show_source_toast);
        assert_eq!(settings.catalog_path, None);
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{ nope").unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let settings = Settings {
            catalog_path: Some("   ".into()),
            raster_url: Some(" https://x/y.png ".into()),
            ..Settings::default()
        };
        assert_eq!(settings.catalog_path(), None);
        assert_eq!(settings.raster_override(), Some("https://x/y.png"));
        assert_eq!(settings.font_path(), None);
    }
}
