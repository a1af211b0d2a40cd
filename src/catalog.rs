//! Sheet catalog: the fixed list of map sheets plus the index raster locator.
//! Loaded once at startup and read-only afterwards.

use crate::constants::EMBEDDED_CATALOG;
use crate::geometry::Region;
use crate::types::{Manifest, ManifestShape, ManifestSheet};
use egui::{pos2, Pos2};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// One topographic map unit
#[derive(Debug, Clone, PartialEq)]
pub struct MapSheet {
    pub id: String,
    pub name: String,
    pub name_ar: Option<String>,
    pub title: String,
    pub geometry: Option<Region>,
    pub href: String,
}

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    DuplicateId(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "failed to read catalog: {e}"),
            CatalogError::Parse(e) => write!(f, "invalid catalog document: {e}"),
            CatalogError::DuplicateId(id) => write!(f, "duplicate sheet id in catalog: {id}"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e)
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    sheets: Vec<MapSheet>,
    by_id: HashMap<String, usize>,
    raster_url: String,
    title: Option<String>,
    source_url: Option<String>,
    version: String,
}

impl Catalog {
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&text)?;
        debug!(path = %path.display(), sheets = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// First user-supplied catalog that loads, else the embedded one.
    /// Candidates that fail are logged and skipped.
    pub fn load_first<I>(candidates: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        for path in candidates {
            match Self::load(&path) {
                Ok(catalog) => {
                    info!(path = %path.display(), version = %catalog.version, "Using catalog file");
                    return Ok(catalog);
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to load catalog, trying next source");
                }
            }
        }
        Self::embedded()
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let manifest: Manifest = serde_json::from_str(text)?;
        Self::from_manifest(manifest)
    }

    pub fn from_manifest(manifest: Manifest) -> Result<Self, CatalogError> {
        let mut sheets = Vec::with_capacity(manifest.sheets.len());
        let mut by_id = HashMap::with_capacity(manifest.sheets.len());

        for entry in manifest.sheets {
            if by_id.contains_key(&entry.id) {
                return Err(CatalogError::DuplicateId(entry.id));
            }
            by_id.insert(entry.id.clone(), sheets.len());
            sheets.push(sheet_from_entry(entry));
        }

        Ok(Self {
            sheets,
            by_id,
            raster_url: manifest.raster_url,
            title: manifest.title,
            source_url: manifest.source_url,
            version: manifest.version,
        })
    }

    pub fn sheets(&self) -> &[MapSheet] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MapSheet> {
        self.index_of(id).map(|i| &self.sheets[i])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn raster_url(&self) -> &str {
        &self.raster_url
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Sheet whose region contains `p` (raster pixels). Later sheets are drawn
    /// on top, so overlaps resolve to the last match in catalog order.
    pub fn sheet_at(&self, p: Pos2) -> Option<&MapSheet> {
        self.sheets
            .iter()
            .rev()
            .find(|s| s.geometry.as_ref().is_some_and(|g| g.contains(p)))
    }
}

fn sheet_from_entry(entry: ManifestSheet) -> MapSheet {
    let geometry = match entry.coords.as_deref() {
        None => None,
        Some(coords) => region_from_coords(entry.shape, coords).or_else(|| {
            warn!(
                id = %entry.id,
                shape = ?entry.shape,
                coords = coords.len(),
                "Unusable sheet geometry, sheet will not be clickable"
            );
            None
        }),
    };

    MapSheet {
        title: entry.title.unwrap_or_else(|| entry.name.clone()),
        id: entry.id,
        name: entry.name,
        name_ar: entry.name_ar.filter(|n| !n.trim().is_empty()),
        geometry,
        href: entry.href,
    }
}

fn region_from_coords(shape: ManifestShape, coords: &[f32]) -> Option<Region> {
    if coords.iter().any(|c| !c.is_finite()) {
        return None;
    }
    match shape {
        ManifestShape::Rect if coords.len() == 4 => Some(Region::rectangle(
            pos2(coords[0], coords[1]),
            pos2(coords[2], coords[3]),
        )),
        ManifestShape::Poly if coords.len() >= 6 && coords.len() % 2 == 0 => Some(Region::polygon(
            coords.chunks_exact(2).map(|c| pos2(c[0], c[1])).collect(),
        )),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::Shape;
    use std::io::Write;

    /// Small catalog shared by tests across modules
    pub(crate) fn sample() -> Catalog {
        Catalog::from_json(
            r#"{
                "raster_url": "index.png",
                "sheets": [
                    { "id": "NH-1", "name": "Tunis", "name_ar": "تونس", "shape": "rect",
                      "coords": [10, 10, 30, 50], "href": "https://maps.example.org/NH-1.zip" },
                    { "id": "NH-2", "name": "Sfax", "name_ar": "صفاقس", "shape": "poly",
                      "coords": [0, 0, 10, 0, 10, 10, 0, 10], "href": "https://maps.example.org/NH-2.zip" },
                    { "id": "NH-3", "name": "Djerba", "shape": "circle",
                      "coords": [5, 5, 2], "href": "https://maps.example.org/NH-3.zip" }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn embedded_catalog_loads() {
        let catalog = Catalog::embedded().unwrap();
        assert!(!catalog.is_empty());
        assert!(!catalog.raster_url().is_empty());
    }

    #[test]
    fn preserves_order_and_indexes_by_id() {
        let catalog = sample();
        let ids: Vec<&str> = catalog.sheets().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["NH-1", "NH-2", "NH-3"]);
        assert_eq!(catalog.get("NH-2").unwrap().name, "Sfax");
        assert_eq!(catalog.index_of("NH-3"), Some(2));
        assert!(catalog.get("NH-9").is_none());
    }

    #[test]
    fn builds_geometry_per_shape() {
        let catalog = sample();
        let rect = catalog.get("NH-1").unwrap().geometry.as_ref().unwrap();
        assert_eq!(rect.shape(), Shape::Rectangle);
        let poly = catalog.get("NH-2").unwrap().geometry.as_ref().unwrap();
        assert_eq!(poly.shape(), Shape::Polygon);
        assert_eq!(poly.points().len(), 4);
        assert!(catalog.get("NH-3").unwrap().geometry.is_none());
    }

    #[test]
    fn malformed_coords_leave_sheet_without_geometry() {
        let catalog = Catalog::from_json(
            r#"{ "raster_url": "x", "sheets": [
                { "id": "a", "name": "A", "shape": "rect", "coords": [1, 2, 3], "href": "h" },
                { "id": "b", "name": "B", "shape": "poly", "coords": [1, 2, 3, 4, 5], "href": "h" },
                { "id": "c", "name": "C", "shape": "poly", "href": "h" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.sheets().iter().all(|s| s.geometry.is_none()));
    }

    #[test]
    fn title_defaults_to_name() {
        let catalog = sample();
        assert_eq!(catalog.get("NH-1").unwrap().title, "Tunis");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Catalog::from_json(
            r#"{ "raster_url": "x", "sheets": [
                { "id": "a", "name": "A", "shape": "rect", "href": "h" },
                { "id": "a", "name": "B", "shape": "rect", "href": "h" }
            ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn sheet_at_prefers_topmost_region() {
        let catalog = sample();
        assert_eq!(catalog.sheet_at(pos2(20.0, 30.0)).unwrap().id, "NH-1");
        assert_eq!(catalog.sheet_at(pos2(5.0, 5.0)).unwrap().id, "NH-2");
        assert!(catalog.sheet_at(pos2(500.0, 500.0)).is_none());

        let overlapping = Catalog::from_json(
            r#"{ "raster_url": "x", "sheets": [
                { "id": "under", "name": "U", "shape": "rect", "coords": [0, 0, 20, 20], "href": "h" },
                { "id": "over", "name": "O", "shape": "rect", "coords": [10, 10, 30, 30], "href": "h" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(overlapping.sheet_at(pos2(15.0, 15.0)).unwrap().id, "over");
        assert_eq!(overlapping.sheet_at(pos2(5.0, 5.0)).unwrap().id, "under");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "raster_url": "r.png", "title": "T", "sheets": [
                {{ "id": "1", "name": "One", "shape": "rect", "coords": [0, 0, 1, 1], "href": "h" }}
            ] }}"#
        )
        .unwrap();
        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.title(), Some("T"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn load_first_skips_broken_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        let good = dir.path().join("good.json");
        std::fs::write(
            &good,
            r#"{ "raster_url": "r.png", "version": "local", "sheets": [] }"#,
        )
        .unwrap();

        let catalog =
            Catalog::load_first([dir.path().join("missing.json"), broken.clone(), good]).unwrap();
        assert_eq!(catalog.version(), "local");

        let fallback = Catalog::load_first([broken]).unwrap();
        assert_eq!(fallback.len(), Catalog::embedded().unwrap().len());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Catalog::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
