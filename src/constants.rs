//! Application constants and configuration

pub const APP_NAME: &str = "Topo Sheet Index";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Catalog shipped with the binary, used when no override is configured
pub const EMBEDDED_CATALOG: &str = include_str!("../assets/catalog.json");

/// Env overrides (take precedence over settings.json)
pub const CATALOG_ENV: &str = "TOPO_INDEX_CATALOG";
pub const RASTER_ENV: &str = "TOPO_INDEX_RASTER";

/// Durable preference records, each stored as JSON text under its own key
pub const FAVORITES_KEY: &str = "sheet-favorites";
pub const DOWNLOADS_KEY: &str = "sheet-downloads";

// Viewport tuning
pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 10.0;
pub const INITIAL_SCALE: f32 = 0.5;
pub const FIT_MARGIN: f32 = 0.95;
pub const WHEEL_ZOOM_RATE: f32 = 0.001;
pub const SELECT_MIN_SCALE: f32 = 1.5;
pub const ZOOM_STEP: f32 = 0.25;

/// Inline lookup on the map shows at most this many hits
pub const QUICK_SEARCH_LIMIT: usize = 5;
