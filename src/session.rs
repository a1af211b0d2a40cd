//! Application session: everything the user can change while browsing.
//! Owned by `App`, passed to whichever view needs it.

use crate::app::filters::filter_sheets;
use crate::catalog::Catalog;
use crate::prefs::Preferences;
use crate::viewport::Viewport;
use egui::Vec2;
use tracing::{debug, info};

pub struct Session {
    pub query: String,
    /// Catalog indices matching `query` (and the favorites toggle)
    pub filtered: Vec<usize>,
    pub favorites_only: bool,
    pub selected: Option<String>,
    pub viewport: Viewport,
    pub prefs: Preferences,
}

impl Session {
    pub fn new(catalog: &Catalog, prefs: Preferences) -> Self {
        Self {
            query: String::new(),
            filtered: (0..catalog.len()).collect(),
            favorites_only: false,
            selected: None,
            viewport: Viewport::default(),
            prefs,
        }
    }

    pub fn set_query(&mut self, query: &str, catalog: &Catalog) {
        self.query = query.to_string();
        self.refresh_filter(catalog);
    }

    pub fn set_favorites_only(&mut self, on: bool, catalog: &Catalog) {
        self.favorites_only = on;
        self.refresh_filter(catalog);
    }

    pub fn refresh_filter(&mut self, catalog: &Catalog) {
        let mut filtered = filter_sheets(&self.query, catalog.sheets());
        if self.favorites_only {
            filtered.retain(|&i| self.prefs.is_favorite(&catalog.sheets()[i].id));
        }
        self.filtered = filtered;
    }

    /// Select a sheet and bring it into view. Unknown ids are kept as the
    /// selection but move nothing.
    pub fn select(&mut self, id: &str, catalog: &Catalog) {
        debug!(id, "Sheet selected");
        self.selected = Some(id.to_string());
        self.recenter_on_selection(catalog);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_sheet<'a>(&self, catalog: &'a Catalog) -> Option<&'a crate::catalog::MapSheet> {
        self.selected.as_deref().and_then(|id| catalog.get(id))
    }

    fn recenter_on_selection(&mut self, catalog: &Catalog) -> bool {
        let Some(region) = self
            .selected_sheet(catalog)
            .and_then(|s| s.geometry.as_ref())
        else {
            return false;
        };
        self.viewport.recenter_on(region)
    }

    /// Index raster metadata arrived: fit it, then honour a selection made
    /// while it was still loading.
    pub fn on_raster_loaded(&mut self, natural: Vec2, container: Option<Vec2>, catalog: &Catalog) {
        info!(width = natural.x, height = natural.y, "Index raster ready");
        self.viewport.on_raster_loaded(natural, container);
        self.recenter_on_selection(catalog);
    }

    pub fn toggle_favorite(&mut self, id: &str, catalog: &Catalog) -> bool {
        let now = self.prefs.toggle_favorite(id);
        if self.favorites_only {
            self.refresh_filter(catalog);
        }
        now
    }

    /// Count a download of `id` and hand back the locator to open. The
    /// count is taken when the action happens, not when a transfer finishes.
    pub fn record_download(&mut self, id: &str, catalog: &Catalog) -> Option<String> {
        let sheet = catalog.get(id)?;
        let count = self.prefs.increment_download(id);
        info!(id, count, "Download requested");
        Some(sheet.href.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample;
    use crate::constants::SELECT_MIN_SCALE;
    use crate::prefs::MemoryStore;
    use crate::viewport::ViewportPhase;
    use egui::vec2;
    use pretty_assertions::assert_eq;

    fn session(catalog: &Catalog) -> Session {
        Session::new(catalog, Preferences::load(Box::new(MemoryStore::default())))
    }

    #[test]
    fn starts_with_everything_listed() {
        let catalog = sample();
        let s = session(&catalog);
        assert_eq!(s.filtered, vec![0, 1, 2]);
        assert!(s.selected.is_none());
    }

    #[test]
    fn query_updates_filtered_list() {
        let catalog = sample();
        let mut s = session(&catalog);
        s.set_query("tun", &catalog);
        assert_eq!(s.filtered, vec![0]);
        s.set_query("zzz", &catalog);
        assert!(s.filtered.is_empty());
        s.set_query("", &catalog);
        assert_eq!(s.filtered, vec![0, 1, 2]);
    }

    #[test]
    fn select_recenters_loaded_viewport() {
        let catalog = sample();
        let mut s = session(&catalog);
        s.on_raster_loaded(vec2(200.0, 200.0), Some(vec2(400.0, 400.0)), &catalog);
        s.select("NH-1", &catalog);
        assert_eq!(s.selected.as_deref(), Some("NH-1"));
        assert_eq!(s.viewport.phase(), ViewportPhase::Recentered);
        assert_eq!(s.viewport.pan(), vec2(80.0, 70.0));
        assert!(s.viewport.scale() >= SELECT_MIN_SCALE);
    }

    #[test]
    fn selection_before_load_applies_once_raster_arrives() {
        let catalog = sample();
        let mut s = session(&catalog);
        s.select("NH-2", &catalog);
        assert_eq!(s.viewport.phase(), ViewportPhase::Uninitialized);

        s.on_raster_loaded(vec2(100.0, 100.0), Some(vec2(50.0, 50.0)), &catalog);
        assert_eq!(s.viewport.phase(), ViewportPhase::Recentered);
        assert_eq!(s.viewport.pan(), vec2(45.0, 45.0));
        assert_eq!(s.viewport.scale(), SELECT_MIN_SCALE);
    }

    #[test]
    fn unknown_or_shapeless_selection_is_inert() {
        let catalog = sample();
        let mut s = session(&catalog);
        s.on_raster_loaded(vec2(100.0, 100.0), Some(vec2(100.0, 100.0)), &catalog);
        let (pan, scale) = (s.viewport.pan(), s.viewport.scale());

        s.select("nope", &catalog);
        assert_eq!(s.selected.as_deref(), Some("nope"));
        assert!(s.selected_sheet(&catalog).is_none());

        s.select("NH-3", &catalog);
        assert_eq!((s.viewport.pan(), s.viewport.scale()), (pan, scale));
        assert_eq!(s.viewport.phase(), ViewportPhase::FittedToContainer);
    }

    #[test]
    fn record_download_counts_every_action() {
        let catalog = sample();
        let mut s = session(&catalog);
        for _ in 0..3 {
            assert_eq!(
                s.record_download("NH-1", &catalog).as_deref(),
                Some("https://maps.example.org/NH-1.zip")
            );
        }
        s.record_download("NH-2", &catalog);
        assert_eq!(s.prefs.download_count("NH-1"), 3);
        assert_eq!(s.prefs.download_count("NH-2"), 1);
        assert_eq!(s.record_download("missing", &catalog), None);
        assert_eq!(s.prefs.download_count("missing"), 0);
    }

    #[test]
    fn favorites_only_composes_with_query() {
        let catalog = sample();
        let mut s = session(&catalog);
        s.toggle_favorite("NH-2", &catalog);
        s.toggle_favorite("NH-3", &catalog);
        s.set_favorites_only(true, &catalog);
        assert_eq!(s.filtered, vec![1, 2]);

        s.set_query("sfax", &catalog);
        assert_eq!(s.filtered, vec![1]);

        s.toggle_favorite("NH-2", &catalog);
        assert!(s.filtered.is_empty());
    }
}
