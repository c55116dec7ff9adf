pub mod http;

pub use http::HttpClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::history::Version;
use crate::Result;

/// Server-side ceiling on entries per version-listing page.
pub const SERVER_PAGE_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub namespace: String,
    /// Latest version on the server, e.g. "v120".
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allowed {
    pub allowed: bool,
}

/// Workspace feature gates relevant to this client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceUsage {
    pub view_history: Allowed,
}

/// Remote history endpoints of the cloud service.
///
/// `list_versions` returns entries in ascending order; implementations page
/// through the server's 50-entry limit internally and always hand back the
/// complete `since..=to` range.
#[async_trait]
pub trait HistoryApi: Send + Sync {
    async fn project_info(&self, project: &str) -> Result<ProjectInfo>;

    async fn list_versions(&self, project: &str, since: u64, to: u64) -> Result<Vec<Version>>;

    async fn workspace_usage(&self, workspace_id: u64) -> Result<WorkspaceUsage>;
}
