use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::client::HistoryApi;
use crate::history::version::{parse_version_name, Version};
use crate::{CartosyncError, Result};

/// Number of versions requested per backward fetch. Larger than the server
/// page limit; the client pages through the window internally.
pub const FETCH_WINDOW: u64 = 100;

/// Outcome of one fetch, delivered as a single atomic unit. The worker never
/// touches the ledger; the consumer of the channel applies pages.
#[derive(Debug)]
pub enum FetchEvent {
    /// One page of versions, newest first.
    Page(Vec<Version>),
    /// The fetch failed without corrupting any state; `retryable` marks
    /// transient failures worth re-issuing.
    Failed { message: String, retryable: bool },
}

/// Compute the `since..=to` window for the next backward fetch.
///
/// `to` re-requests the boundary version as the page anchor of the windowed
/// protocol; the ledger drops the duplicate on apply. `since` is clamped at
/// the root version.
pub fn fetch_window(to: u64) -> (u64, u64) {
    let since = to.saturating_sub(FETCH_WINDOW).max(1);
    (since, to)
}

fn is_retryable(error: &CartosyncError) -> bool {
    match error {
        CartosyncError::Network(_) | CartosyncError::Io(_) => true,
        CartosyncError::Api { status, .. } => *status >= 500 || *status == 429,
        _ => false,
    }
}

/// Asynchronous pagination worker retrieving older version pages.
///
/// At most one fetch is ever in flight; a request issued while one is
/// running is a no-op. Results arrive on the channel handed out by
/// [`VersionsFetcher::new`], keeping ledger mutation on the consumer side.
pub struct VersionsFetcher {
    api: Arc<dyn HistoryApi>,
    project: String,
    tx: UnboundedSender<FetchEvent>,
    in_flight: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl VersionsFetcher {
    pub fn new(api: Arc<dyn HistoryApi>, project: impl Into<String>) -> (Self, UnboundedReceiver<FetchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            VersionsFetcher {
                api,
                project: project.into(),
                tx,
                in_flight: Arc::new(AtomicBool::new(false)),
                task: None,
            },
            rx,
        )
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Start fetching the page below `oldest` (or the newest page when the
    /// ledger is still empty). Returns false without any side effect when a
    /// fetch is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request_page(&mut self, oldest: Option<u64>) -> bool {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!("fetch already in flight, ignoring request");
            return false;
        }

        let api = Arc::clone(&self.api);
        let project = self.project.clone();
        let tx = self.tx.clone();
        let in_flight = Arc::clone(&self.in_flight);

        self.task = Some(tokio::spawn(async move {
            let event = match fetch_page(api.as_ref(), &project, oldest).await {
                Ok(page) => {
                    tracing::debug!(project = %project, entries = page.len(), "fetched version page");
                    FetchEvent::Page(page)
                }
                Err(error) => {
                    tracing::warn!(project = %project, %error, "version fetch failed");
                    FetchEvent::Failed {
                        retryable: is_retryable(&error),
                        message: error.to_string(),
                    }
                }
            };
            // Release the guard before delivery so the consumer may retry
            // as soon as it sees the event.
            in_flight.store(false, Ordering::SeqCst);
            let _ = tx.send(event);
        }));
        true
    }

    /// Abort the in-flight fetch, if any. Safe against completed tasks; the
    /// ledger is never left partially updated because pages apply atomically
    /// on the consumer side.
    pub fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

impl Drop for VersionsFetcher {
    fn drop(&mut self) {
        self.abort();
    }
}

async fn fetch_page(api: &dyn HistoryApi, project: &str, oldest: Option<u64>) -> Result<Vec<Version>> {
    let to = match oldest {
        Some(oldest) => oldest,
        None => {
            // Initial fetch: one extra round-trip to learn the newest
            // version on the server.
            let info = api.project_info(project).await?;
            parse_version_name(&info.version)?
        }
    };
    let (since, to) = fetch_window(to);

    let mut page = api.list_versions(project, since, to).await?;
    // The server responds in ascending order; the ledger wants newest first.
    page.reverse();
    Ok(page)
}
