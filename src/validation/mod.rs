pub mod validator;

pub use validator::ProjectValidator;

use serde::{Deserialize, Serialize};

use crate::help::HelpIndex;
use crate::host::LayerId;

/// Closed set of validation rules. Doubles as control flow (the two
/// foundational project checks abort the pipeline) and as the key into the
/// display message table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningKind {
    ProjNotLoaded,
    ProjNotFound,
    MultipleProjs,
    AbsolutePaths,
    EditableNonGpkg,
    ExternalSrc,
    NotForOffline,
    NoEditableLayers,
    AttachmentAbsolutePath,
    AttachmentLocalPath,
    AttachmentExpressionPath,
    AttachmentHyperlink,
    DatabaseSchemaChange,
}

impl WarningKind {
    /// Human-readable message for this rule. Rules pointing at setup
    /// documentation embed a help link.
    pub fn message(&self, help: &HelpIndex) -> String {
        match self {
            WarningKind::ProjNotLoaded => {
                "The project is not loaded. Open it to allow validation".to_string()
            }
            WarningKind::ProjNotFound => "No project file found in the directory".to_string(),
            WarningKind::MultipleProjs => {
                "Multiple project files found in the directory".to_string()
            }
            WarningKind::AbsolutePaths => {
                "Project saves layers using absolute paths".to_string()
            }
            WarningKind::EditableNonGpkg => {
                "Editable layer stored in a format other than GeoPackage".to_string()
            }
            WarningKind::ExternalSrc => "Layer stored out of the project directory".to_string(),
            WarningKind::NotForOffline => format!(
                "Layer might not be available when offline. <a href='{}'>Read more.</a>",
                help.howto_background_maps()
            ),
            WarningKind::NoEditableLayers => "No editable layers in the project".to_string(),
            WarningKind::AttachmentAbsolutePath => format!(
                "Attachment widget uses absolute paths. <a href='{}'>Read more.</a>",
                help.howto_attachment_widget()
            ),
            WarningKind::AttachmentLocalPath => "Attachment widget uses local path".to_string(),
            WarningKind::AttachmentExpressionPath => {
                "Attachment widget incorrectly uses expression-based path".to_string()
            }
            WarningKind::AttachmentHyperlink => "Attachment widget uses hyperlink".to_string(),
            WarningKind::DatabaseSchemaChange => "Database schema was changed".to_string(),
        }
    }
}

/// One validation finding, immutable once constructed.
///
/// Project-scoped issues may group the matching layers so a rule that fires
/// for many layers renders as a single message; layer-scoped issues point at
/// exactly one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssue {
    Project {
        kind: WarningKind,
        layers: Vec<LayerId>,
    },
    Layer {
        kind: WarningKind,
        layer: LayerId,
    },
}

impl ValidationIssue {
    pub fn project(kind: WarningKind) -> Self {
        ValidationIssue::Project {
            kind,
            layers: Vec::new(),
        }
    }

    pub fn grouped(kind: WarningKind, layers: Vec<LayerId>) -> Self {
        ValidationIssue::Project { kind, layers }
    }

    pub fn layer(kind: WarningKind, layer: impl Into<LayerId>) -> Self {
        ValidationIssue::Layer {
            kind,
            layer: layer.into(),
        }
    }

    pub fn kind(&self) -> WarningKind {
        match self {
            ValidationIssue::Project { kind, .. } => *kind,
            ValidationIssue::Layer { kind, .. } => *kind,
        }
    }

    /// Layer ids this issue points at (possibly empty for project-wide
    /// findings).
    pub fn layer_ids(&self) -> Vec<&LayerId> {
        match self {
            ValidationIssue::Project { layers, .. } => layers.iter().collect(),
            ValidationIssue::Layer { layer, .. } => vec![layer],
        }
    }
}
