//! Shared builders for the integration suites: scripted remote APIs,
//! temporary project directories, and host snapshots.
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;
use tokio::sync::Notify;

use cartosync::client::{Allowed, HistoryApi, ProjectInfo, WorkspaceUsage};
use cartosync::history::Version;
use cartosync::host::{EditorWidget, LayerKind, MapLayer, ProjectSnapshot, ProviderCaps};
use cartosync::project::{write_metadata, ProjectMetadata};
use cartosync::{CartosyncError, Result};

pub fn version(number: u64) -> Version {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    Version::new(
        format!("v{}", number),
        "anna",
        base + Duration::minutes(number as i64),
    )
}

/// In-memory remote API with a linear history `v1..=latest`.
///
/// An optional gate holds `list_versions` until released, so tests can pin a
/// fetch in flight deterministically. A queued error is returned (once) by
/// the next `list_versions` call.
pub struct ScriptedApi {
    pub latest: u64,
    pub view_history: bool,
    pub gate: Option<Arc<Notify>>,
    pub next_error: Mutex<Option<CartosyncError>>,
    pub info_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new(latest: u64) -> Self {
        ScriptedApi {
            latest,
            view_history: true,
            gate: None,
            next_error: Mutex::new(None),
            info_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn gated(latest: u64) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let mut api = Self::new(latest);
        api.gate = Some(Arc::clone(&gate));
        (api, gate)
    }

    pub fn failing_with(latest: u64, error: CartosyncError) -> Self {
        let api = Self::new(latest);
        *api.next_error.lock().unwrap() = Some(error);
        api
    }
}

#[async_trait]
impl HistoryApi for ScriptedApi {
    async fn project_info(&self, _project: &str) -> Result<ProjectInfo> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ProjectInfo {
            name: "survey".to_string(),
            namespace: "fieldwork".to_string(),
            version: format!("v{}", self.latest),
        })
    }

    async fn list_versions(&self, _project: &str, since: u64, to: u64) -> Result<Vec<Version>> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Err(error);
        }
        let to = to.min(self.latest);
        Ok((since..=to).map(version).collect())
    }

    async fn workspace_usage(&self, _workspace_id: u64) -> Result<WorkspaceUsage> {
        Ok(WorkspaceUsage {
            view_history: Allowed {
                allowed: self.view_history,
            },
        })
    }
}

/// Temporary directory holding the given project definition files.
pub fn project_dir_with(files: &[&str]) -> TempDir {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    for name in files {
        std::fs::write(tmp.path().join(name), "<project/>").expect("Failed to write project file");
    }
    tmp
}

/// Add cloud-sync metadata to a project directory.
pub fn make_cloud_project(dir: &Path, version_name: &str) {
    write_metadata(
        dir,
        &ProjectMetadata {
            name: "survey".to_string(),
            namespace: "fieldwork".to_string(),
            version: version_name.to_string(),
            workspace_id: 9,
        },
    )
    .expect("Failed to write project metadata");
}

/// Snapshot whose loaded file matches `dir/<file>`.
pub fn snapshot_for(dir: &Path, file: &str) -> ProjectSnapshot {
    ProjectSnapshot::new(dir.join(file))
}

pub fn vector_layer(
    id: &str,
    provider: &str,
    storage: &str,
    source: &str,
    editable: bool,
) -> MapLayer {
    MapLayer {
        id: id.to_string(),
        name: id.to_string(),
        kind: LayerKind::Vector,
        provider: Some(provider.to_string()),
        storage: storage.to_string(),
        source: source.to_string(),
        caps: ProviderCaps {
            add_features: editable,
            change_attributes: editable,
        },
        widgets: Vec::new(),
    }
}

pub fn raster_layer(id: &str, provider: &str, source: &str) -> MapLayer {
    MapLayer {
        id: id.to_string(),
        name: id.to_string(),
        kind: LayerKind::Raster,
        provider: Some(provider.to_string()),
        storage: String::new(),
        source: source.to_string(),
        caps: ProviderCaps::default(),
        widgets: Vec::new(),
    }
}

pub fn attachment_widget(
    relative_storage: i64,
    default_root: Option<&str>,
    use_link: bool,
) -> EditorWidget {
    let mut config = serde_json::Map::new();
    config.insert("RelativeStorage".to_string(), relative_storage.into());
    if let Some(root) = default_root {
        config.insert("DefaultRoot".to_string(), root.into());
    }
    if use_link {
        config.insert("UseLink".to_string(), true.into());
    }
    EditorWidget {
        kind: "ExternalResource".to_string(),
        config,
    }
}
