use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::client::HistoryApi;
use crate::history::fetcher::{FetchEvent, VersionsFetcher};
use crate::history::ledger::{RowsChanged, VersionLedger};
use crate::project::{is_cloud_project, LocalProject};
use crate::Result;

/// Terminal conditions resolved once when a history view is constructed.
/// None of these are retryable within the view's lifetime.
#[derive(Debug, Error)]
pub enum HistoryUnavailable {
    #[error("Client is not configured")]
    NotConfigured,

    #[error("Current project is not a cloud project. Project history is not available")]
    NotCloudProject,

    #[error("The workspace does not allow to view project history")]
    PermissionDenied,

    #[error("{0}")]
    Client(String),
}

/// One opened history view over a checked-out project.
///
/// Owns the ledger, the fetch worker, and the delivery channel. The ledger
/// is mutated exclusively here, on the consumer side of the channel; the
/// worker only produces immutable page payloads.
pub struct HistorySession {
    project: LocalProject,
    ledger: VersionLedger,
    fetcher: VersionsFetcher,
    events: UnboundedReceiver<FetchEvent>,
}

impl HistorySession {
    /// Resolve configuration and permission errors up front and construct
    /// the session. Gating mirrors the view-construction checks: cloud
    /// project layout, readable metadata, workspace history permission.
    pub async fn open(
        api: Arc<dyn HistoryApi>,
        project_dir: &Path,
    ) -> std::result::Result<Self, HistoryUnavailable> {
        if !is_cloud_project(project_dir) {
            return Err(HistoryUnavailable::NotCloudProject);
        }
        let project =
            LocalProject::open(project_dir).map_err(|e| HistoryUnavailable::Client(e.to_string()))?;

        let usage = api
            .workspace_usage(project.workspace_id())
            .await
            .map_err(|e| HistoryUnavailable::Client(e.to_string()))?;
        if !usage.view_history.allowed {
            return Err(HistoryUnavailable::PermissionDenied);
        }

        let mut ledger = VersionLedger::new();
        ledger.set_current_version(project.version_number().ok());

        let (fetcher, events) = VersionsFetcher::new(api, project.project_full_name());

        Ok(HistorySession {
            project,
            ledger,
            fetcher,
            events,
        })
    }

    pub fn project(&self) -> &LocalProject {
        &self.project
    }

    pub fn ledger(&self) -> &VersionLedger {
        &self.ledger
    }

    /// Trigger a backward fetch. No-op (returning false) when the root
    /// version is already known or a fetch is still running; callers invoke
    /// this from their scroll-at-bottom trigger.
    pub fn fetch_older(&mut self) -> bool {
        if !self.ledger.can_extend_backward() {
            return false;
        }
        self.fetcher.request_page(self.ledger.oldest())
    }

    pub fn is_fetching(&self) -> bool {
        self.fetcher.is_running()
    }

    /// Wait for the next delivery from the worker. Returns None if the
    /// worker side has gone away.
    pub async fn next_event(&mut self) -> Option<FetchEvent> {
        self.events.recv().await
    }

    /// Apply a delivered page to the ledger (all-or-nothing).
    pub fn apply_page(&mut self, page: Vec<crate::history::Version>) -> Result<Option<RowsChanged>> {
        self.ledger.append_older(page)
    }
}
