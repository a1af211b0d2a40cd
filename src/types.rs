//! Common types and data structures

use serde::{Deserialize, Serialize};

/// Which main panel is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Map,
    List,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Map => ViewMode::List,
            ViewMode::List => ViewMode::Map,
        }
    }
}

/// Catalog document as stored on disk / embedded in the binary
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub title: Option<String>,
    pub raster_url: String,
    #[serde(default)]
    pub source_url: Option<String>,
    pub sheets: Vec<ManifestSheet>,
}

/// Shape tag of an image-map area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestShape {
    Rect,
    Poly,
    Circle,
}

/// Individual sheet entry in the catalog document
#[derive(Debug, Deserialize)]
pub struct ManifestSheet {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "nameAr")]
    pub name_ar: Option<String>,
    pub shape: ManifestShape,
    #[serde(default)]
    pub coords: Option<Vec<f32>>,
    pub href: String,
    #[serde(default)]
    pub title: Option<String>,
}
