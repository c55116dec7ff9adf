/// Abstraction over the host GIS application's project and layer graph.
///
/// The validator never talks to a live host directly; callers capture the
/// loaded project into a [`ProjectSnapshot`] and hand it over. The snapshot
/// types are serde-enabled so a captured project can also be replayed from
/// disk (used by the CLI and the test suites).
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::project::LocalProject;
use crate::Result;

pub type LayerId = String;

/// Providers backed by network services; layers using them are unavailable
/// when working offline.
pub const NET_PROVIDERS: &[&str] = &[
    "WFS",
    "arcgisfeatureserver",
    "arcgismapserver",
    "geonode",
    "ows",
    "wcs",
    "wms",
    "vectortile",
];

/// Providers backed by live database connections.
pub const DB_PROVIDERS: &[&str] = &["postgres", "mssql", "oracle", "hana", "postgresraster", "DB2"];

/// Providers that read from local files.
pub const FILE_BASED_PROVIDERS: &[&str] = &[
    "ogr",
    "gdal",
    "spatialite",
    "delimitedtext",
    "gpx",
    "mdal",
    "grass",
    "grassraster",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    Vector,
    Raster,
    Mesh,
    VectorTile,
}

/// Editing capabilities reported by a layer's data provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCaps {
    #[serde(default)]
    pub add_features: bool,
    #[serde(default)]
    pub change_attributes: bool,
}

impl ProviderCaps {
    pub fn can_edit(&self) -> bool {
        self.add_features || self.change_attributes
    }
}

/// Editor widget configuration attached to a layer field.
///
/// The config map mirrors the host's free-form widget configuration
/// dictionary, so checks read keys like `RelativeStorage` and `DefaultRoot`
/// exactly as the host stores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorWidget {
    pub kind: String,
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

/// Widget kind used for attachment fields.
pub const EXTERNAL_RESOURCE_WIDGET: &str = "ExternalResource";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayer {
    pub id: LayerId,
    pub name: String,
    pub kind: LayerKind,
    /// Provider name, if the layer has a discoverable data provider.
    pub provider: Option<String>,
    /// Storage format reported by the provider, e.g. "GPKG".
    #[serde(default)]
    pub storage: String,
    /// Public source string as the host reports it.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub caps: ProviderCaps,
    #[serde(default)]
    pub widgets: Vec<EditorWidget>,
}

impl MapLayer {
    /// Extract the filesystem path from the layer source string.
    ///
    /// GeoPackage sources look like `GPKG:/path/to/file.gpkg:layername`,
    /// other file sources may carry `|layername=...` style suffixes.
    pub fn source_path(&self) -> PathBuf {
        if let Some(stripped) = self.source.strip_prefix("GPKG:") {
            let path = match stripped.rfind(':') {
                Some(pos) => &stripped[..pos],
                None => stripped,
            };
            PathBuf::from(path)
        } else {
            let path = self.source.split('|').next().unwrap_or(&self.source);
            PathBuf::from(path)
        }
    }

    pub fn is_vector(&self) -> bool {
        self.kind == LayerKind::Vector
    }
}

/// Snapshot of the project currently loaded in the host application.
///
/// Layers are keyed by id in a BTreeMap, so every walk over the snapshot is
/// deterministic and repeated validation runs produce identical issue lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Absolute path of the loaded project file.
    pub file_path: PathBuf,
    /// True when the project stores layer paths as absolute paths.
    #[serde(default)]
    pub absolute_paths: bool,
    #[serde(default)]
    pub layers: BTreeMap<LayerId, MapLayer>,
}

impl ProjectSnapshot {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        ProjectSnapshot {
            file_path: file_path.into(),
            absolute_paths: false,
            layers: BTreeMap::new(),
        }
    }

    pub fn add_layer(&mut self, layer: MapLayer) {
        self.layers.insert(layer.id.clone(), layer);
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| crate::CartosyncError::Parse(format!("invalid project snapshot: {}", e)))
    }
}

/// Host-supplied expression engine.
///
/// The validator only needs to know whether a string parses as a valid
/// dynamic expression; the host owns the expression language.
pub trait ExpressionEngine {
    fn is_valid(&self, expression: &str) -> bool;
}

/// Expression engine for contexts without a host, e.g. the CLI.
/// Treats nothing as a valid expression.
pub struct NoExpressions;

impl ExpressionEngine for NoExpressions {
    fn is_valid(&self, _expression: &str) -> bool {
        false
    }
}

/// External diff collaborator detecting schema drift against the last
/// synced baseline of a layer.
pub trait SchemaDiff {
    fn has_schema_change(&self, project: &LocalProject, layer: &MapLayer) -> Result<(bool, String)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer_with_source(source: &str) -> MapLayer {
        MapLayer {
            id: "l1".to_string(),
            name: "roads".to_string(),
            kind: LayerKind::Vector,
            provider: Some("ogr".to_string()),
            storage: "GPKG".to_string(),
            source: source.to_string(),
            caps: ProviderCaps::default(),
            widgets: Vec::new(),
        }
    }

    #[test]
    fn test_source_path_gpkg_prefix() {
        let layer = layer_with_source("GPKG:/data/project/roads.gpkg:roads");
        assert_eq!(layer.source_path(), PathBuf::from("/data/project/roads.gpkg"));
    }

    #[test]
    fn test_source_path_pipe_suffix() {
        let layer = layer_with_source("/data/project/roads.shp|layername=roads");
        assert_eq!(layer.source_path(), PathBuf::from("/data/project/roads.shp"));
    }

    #[test]
    fn test_source_path_plain() {
        let layer = layer_with_source("/data/project/dem.tif");
        assert_eq!(layer.source_path(), PathBuf::from("/data/project/dem.tif"));
    }
}
