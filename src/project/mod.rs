/// Local metadata of a project checked out from the cloud service.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::history::parse_version_name;
use crate::{CartosyncError, Result};

/// Subdirectory holding sync metadata inside a checked-out project.
pub const METADATA_DIR: &str = ".cartosync";
pub const METADATA_FILE: &str = "project.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
    pub namespace: String,
    /// Locally checked-out version, e.g. "v42".
    pub version: String,
    pub workspace_id: u64,
}

/// A project directory with cloud-sync metadata.
#[derive(Debug, Clone)]
pub struct LocalProject {
    dir: PathBuf,
    meta: ProjectMetadata,
}

impl LocalProject {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let meta_path = dir.join(METADATA_DIR).join(METADATA_FILE);
        if !meta_path.exists() {
            return Err(CartosyncError::Project(format!(
                "{} is not a cloud project (missing {}/{})",
                dir.display(),
                METADATA_DIR,
                METADATA_FILE
            )));
        }
        let contents = std::fs::read_to_string(&meta_path)?;
        let meta: ProjectMetadata = serde_json::from_str(&contents).map_err(|e| {
            CartosyncError::Project(format!("corrupt metadata in {}: {}", meta_path.display(), e))
        })?;
        Ok(LocalProject { dir, meta })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Checked-out version name, e.g. "v42".
    pub fn version(&self) -> &str {
        &self.meta.version
    }

    pub fn version_number(&self) -> Result<u64> {
        parse_version_name(&self.meta.version)
    }

    pub fn workspace_id(&self) -> u64 {
        self.meta.workspace_id
    }

    /// Full name on the remote service: `namespace/name`.
    pub fn project_full_name(&self) -> String {
        format!("{}/{}", self.meta.namespace, self.meta.name)
    }
}

/// Check whether a directory carries the cloud-sync metadata layout.
pub fn is_cloud_project(dir: &Path) -> bool {
    dir.join(METADATA_DIR).join(METADATA_FILE).is_file()
}

/// Write project metadata into `dir`, creating the metadata subdirectory.
pub fn write_metadata(dir: &Path, meta: &ProjectMetadata) -> Result<()> {
    let meta_dir = dir.join(METADATA_DIR);
    std::fs::create_dir_all(&meta_dir)?;
    let contents = serde_json::to_string_pretty(meta)
        .map_err(|e| CartosyncError::Other(format!("failed to serialize metadata: {}", e)))?;
    std::fs::write(meta_dir.join(METADATA_FILE), contents)?;
    Ok(())
}
