use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::host::{
    ExpressionEngine, LayerId, NoExpressions, ProjectSnapshot, SchemaDiff, DB_PROVIDERS,
    EXTERNAL_RESOURCE_WIDGET, NET_PROVIDERS,
};
use crate::project::LocalProject;
use crate::utils::{find_project_files, is_within_dir, same_path};
use crate::validation::{ValidationIssue, WarningKind};
use crate::Result;

/// Storage format required for editable layers.
pub const EDITABLE_FORMAT: &str = "GPKG";

/// Rule pipeline checking a project directory (and the snapshot of the
/// project loaded in the host) for cloud-sync compatibility.
///
/// Single-shot: [`run_checks`](Self::run_checks) consumes the validator and
/// returns the collected issues. The two foundational checks abort the
/// pipeline early because every later rule needs a valid loaded layer
/// graph; everything after them always runs to completion.
pub struct ProjectValidator<'a> {
    project_dir: PathBuf,
    snapshot: Option<&'a ProjectSnapshot>,
    local: Option<&'a LocalProject>,
    expressions: &'a dyn ExpressionEngine,
    schema_diff: Option<&'a dyn SchemaDiff>,
    issues: Vec<ValidationIssue>,
    editable: Vec<LayerId>,
    by_provider: BTreeMap<String, Vec<LayerId>>,
    project_file: Option<PathBuf>,
}

impl<'a> ProjectValidator<'a> {
    pub fn new(project_dir: impl Into<PathBuf>, snapshot: Option<&'a ProjectSnapshot>) -> Self {
        ProjectValidator {
            project_dir: project_dir.into(),
            snapshot,
            local: None,
            expressions: &NoExpressions,
            schema_diff: None,
            issues: Vec::new(),
            editable: Vec::new(),
            by_provider: BTreeMap::new(),
            project_file: None,
        }
    }

    /// Attach local sync metadata; enables the schema-drift check.
    pub fn with_local(mut self, local: &'a LocalProject) -> Self {
        self.local = Some(local);
        self
    }

    pub fn with_expressions(mut self, expressions: &'a dyn ExpressionEngine) -> Self {
        self.expressions = expressions;
        self
    }

    pub fn with_schema_diff(mut self, schema_diff: &'a dyn SchemaDiff) -> Self {
        self.schema_diff = Some(schema_diff);
        self
    }

    /// Run the full pipeline and return the issue list.
    pub fn run_checks(mut self) -> Result<Vec<ValidationIssue>> {
        if !self.check_single_project()? {
            return Ok(self.issues);
        }
        let Some(snapshot) = self.snapshot else {
            self.issues
                .push(ValidationIssue::project(WarningKind::ProjNotLoaded));
            return Ok(self.issues);
        };
        if !self.check_project_loaded(snapshot) {
            return Ok(self.issues);
        }
        self.harvest_layers(snapshot);
        self.check_paths_relative(snapshot);
        self.check_editable_format(snapshot);
        self.check_saved_in_project_dir(snapshot);
        self.check_offline(snapshot);
        self.check_attachment_widgets(snapshot);
        self.check_db_schema(snapshot);
        Ok(self.issues)
    }

    /// Exactly one project definition file must exist in the directory.
    fn check_single_project(&mut self) -> Result<bool> {
        let files = find_project_files(&self.project_dir)?;
        match files.len() {
            0 => {
                self.issues
                    .push(ValidationIssue::project(WarningKind::ProjNotFound));
                Ok(false)
            }
            1 => {
                self.project_file = files.into_iter().next();
                Ok(true)
            }
            _ => {
                self.issues
                    .push(ValidationIssue::project(WarningKind::MultipleProjs));
                Ok(false)
            }
        }
    }

    /// The on-disk project file must be the one loaded in the host.
    fn check_project_loaded(&mut self, snapshot: &ProjectSnapshot) -> bool {
        let loaded = self
            .project_file
            .as_deref()
            .map(|found| same_path(found, &snapshot.file_path))
            .unwrap_or(false);
        if !loaded {
            self.issues
                .push(ValidationIssue::project(WarningKind::ProjNotLoaded));
        }
        loaded
    }

    /// Build the provider partition and the editable-layer subset.
    fn harvest_layers(&mut self, snapshot: &ProjectSnapshot) {
        for (lid, layer) in &snapshot.layers {
            if let Some(provider) = &layer.provider {
                self.by_provider
                    .entry(provider.clone())
                    .or_default()
                    .push(lid.clone());
            }
            if layer.is_vector() && layer.caps.can_edit() {
                self.editable.push(lid.clone());
            }
        }
        if self.editable.is_empty() {
            self.issues
                .push(ValidationIssue::project(WarningKind::NoEditableLayers));
        }
    }

    fn check_paths_relative(&mut self, snapshot: &ProjectSnapshot) {
        if snapshot.absolute_paths {
            self.issues
                .push(ValidationIssue::project(WarningKind::AbsolutePaths));
        }
    }

    /// Editable vector layers must be stored as GeoPackage.
    fn check_editable_format(&mut self, snapshot: &ProjectSnapshot) {
        for lid in &self.editable {
            let Some(layer) = snapshot.layers.get(lid) else {
                continue;
            };
            if layer.storage != EDITABLE_FORMAT {
                self.issues
                    .push(ValidationIssue::layer(WarningKind::EditableNonGpkg, lid));
            }
        }
    }

    /// File-based layers must live inside the project directory.
    fn check_saved_in_project_dir(&mut self, snapshot: &ProjectSnapshot) {
        for (lid, layer) in &snapshot.layers {
            match layer.provider.as_deref() {
                Some("gdal") | Some("ogr") => {}
                _ => continue,
            }
            let path = layer.source_path();
            // Relative sources resolve against the project directory.
            if path.is_relative() {
                continue;
            }
            if !is_within_dir(&path, &self.project_dir) {
                self.issues
                    .push(ValidationIssue::layer(WarningKind::ExternalSrc, lid));
            }
        }
    }

    /// Layers on network or live-database providers are grouped into one
    /// offline-availability warning.
    fn check_offline(&mut self, snapshot: &ProjectSnapshot) {
        let mut matching = Vec::new();
        for (lid, layer) in &snapshot.layers {
            // No discoverable provider (e.g. vector tiles): skip.
            let Some(provider) = layer.provider.as_deref() else {
                continue;
            };
            if NET_PROVIDERS.contains(&provider) || DB_PROVIDERS.contains(&provider) {
                matching.push(lid.clone());
            }
        }
        if !matching.is_empty() {
            self.issues.push(ValidationIssue::grouped(
                WarningKind::NotForOffline,
                matching,
            ));
        }
    }

    /// Attachment (external-resource) widgets on editable layers must use
    /// relative storage and must not configure a local or expression-based
    /// default root. Conditions fire independently, possibly several per
    /// field.
    fn check_attachment_widgets(&mut self, snapshot: &ProjectSnapshot) {
        for lid in &self.editable {
            let Some(layer) = snapshot.layers.get(lid) else {
                continue;
            };
            for widget in &layer.widgets {
                if widget.kind != EXTERNAL_RESOURCE_WIDGET {
                    continue;
                }
                let cfg = &widget.config;
                if cfg.get("RelativeStorage").and_then(|v| v.as_i64()) == Some(0) {
                    self.issues.push(ValidationIssue::layer(
                        WarningKind::AttachmentAbsolutePath,
                        lid,
                    ));
                }
                if let Some(root) = cfg.get("DefaultRoot").and_then(|v| v.as_str()) {
                    // The default root must not point at a local path.
                    if std::path::Path::new(root).is_absolute() {
                        self.issues
                            .push(ValidationIssue::layer(WarningKind::AttachmentLocalPath, lid));
                    }
                    // Expression-based paths belong in a data-defined
                    // override, not in the default root.
                    if self.expressions.is_valid(root) {
                        self.issues.push(ValidationIssue::layer(
                            WarningKind::AttachmentExpressionPath,
                            lid,
                        ));
                    }
                    if cfg.contains_key("UseLink") {
                        self.issues
                            .push(ValidationIssue::layer(WarningKind::AttachmentHyperlink, lid));
                    }
                }
            }
        }
    }

    /// GeoPackage editable layers are compared against their last-synced
    /// schema baseline. A failing diff is logged and skipped rather than
    /// aborting the run.
    fn check_db_schema(&mut self, snapshot: &ProjectSnapshot) {
        let (Some(local), Some(diff)) = (self.local, self.schema_diff) else {
            return;
        };
        for lid in &self.editable {
            let Some(layer) = snapshot.layers.get(lid) else {
                continue;
            };
            if layer.storage != EDITABLE_FORMAT {
                continue;
            }
            match diff.has_schema_change(local, layer) {
                Ok((true, _)) => {
                    self.issues.push(ValidationIssue::layer(
                        WarningKind::DatabaseSchemaChange,
                        lid,
                    ));
                }
                Ok((false, _)) => {}
                Err(error) => {
                    tracing::warn!(layer = %lid, %error, "schema diff failed");
                }
            }
        }
    }
}
