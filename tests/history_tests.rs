mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use cartosync::history::{FetchEvent, HistorySession, HistoryUnavailable, VersionLedger, VersionsFetcher};
use cartosync::CartosyncError;
use common::{make_cloud_project, project_dir_with, ScriptedApi};

#[tokio::test]
async fn test_initial_fetch_seeds_window_from_project_info() {
    let api = Arc::new(ScriptedApi::new(120));
    let (mut fetcher, mut rx) = VersionsFetcher::new(api.clone(), "fieldwork/survey");

    assert!(fetcher.request_page(None));
    let event = rx.recv().await.expect("worker delivered no event");
    let page = match event {
        FetchEvent::Page(page) => page,
        other => panic!("unexpected event: {:?}", other),
    };

    assert_eq!(api.info_calls.load(Ordering::SeqCst), 1);
    // Window 20..=120, delivered newest first.
    assert_eq!(page.len(), 101);
    assert_eq!(page.first().unwrap().name, "v120");
    assert_eq!(page.last().unwrap().name, "v20");

    let mut ledger = VersionLedger::new();
    ledger.append_older(page).unwrap();
    assert_eq!(ledger.newest(), Some(120));
    assert_eq!(ledger.oldest(), Some(20));
    assert!(ledger.can_extend_backward());
}

#[tokio::test]
async fn test_pagination_reaches_root_and_stops() {
    let api = Arc::new(ScriptedApi::new(120));
    let (mut fetcher, mut rx) = VersionsFetcher::new(api.clone(), "fieldwork/survey");
    let mut ledger = VersionLedger::new();

    loop {
        if !ledger.can_extend_backward() {
            break;
        }
        assert!(fetcher.request_page(ledger.oldest()));
        match rx.recv().await.expect("worker delivered no event") {
            FetchEvent::Page(page) => {
                ledger.append_older(page).unwrap();
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    assert_eq!(ledger.oldest(), Some(1));
    assert_eq!(ledger.newest(), Some(120));
    // The boundary re-request never produces duplicates in the ledger.
    assert_eq!(ledger.row_count(), 120);
    assert!(!ledger.can_extend_backward());

    // Rows stay strictly descending.
    let numbers: Vec<u64> = ledger.iter().map(|v| v.number().unwrap()).collect();
    let mut sorted = numbers.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(numbers, sorted);
}

#[tokio::test]
async fn test_second_request_while_running_is_a_noop() {
    let (api, gate) = ScriptedApi::gated(120);
    let api = Arc::new(api);
    let (mut fetcher, mut rx) = VersionsFetcher::new(api.clone(), "fieldwork/survey");

    assert!(fetcher.request_page(None));
    assert!(fetcher.is_running());
    // Refused while the first fetch is pinned in flight.
    assert!(!fetcher.request_page(None));

    gate.notify_one();
    let event = rx.recv().await.expect("worker delivered no event");
    assert!(matches!(event, FetchEvent::Page(_)));
    assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_failure_is_surfaced_and_guard_released() {
    let api = Arc::new(ScriptedApi::failing_with(
        120,
        CartosyncError::Api {
            status: 503,
            message: "unavailable".to_string(),
        },
    ));
    let (mut fetcher, mut rx) = VersionsFetcher::new(api.clone(), "fieldwork/survey");

    assert!(fetcher.request_page(Some(120)));
    match rx.recv().await.expect("worker delivered no event") {
        FetchEvent::Failed { retryable, message } => {
            assert!(retryable);
            assert!(message.contains("unavailable"));
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // The error was consumed; the retry succeeds.
    assert!(!fetcher.is_running());
    assert!(fetcher.request_page(Some(120)));
    match rx.recv().await.expect("worker delivered no event") {
        FetchEvent::Page(page) => assert!(!page.is_empty()),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_session_open_requires_cloud_project() {
    let api = Arc::new(ScriptedApi::new(120));
    let dir = project_dir_with(&["survey.qgs"]);

    let result = HistorySession::open(api, dir.path()).await;
    assert!(matches!(result, Err(HistoryUnavailable::NotCloudProject)));
}

#[tokio::test]
async fn test_session_open_requires_history_permission() {
    let mut api = ScriptedApi::new(120);
    api.view_history = false;
    let api = Arc::new(api);

    let dir = project_dir_with(&["survey.qgs"]);
    make_cloud_project(dir.path(), "v17");

    let result = HistorySession::open(api, dir.path()).await;
    assert!(matches!(result, Err(HistoryUnavailable::PermissionDenied)));
}

#[tokio::test]
async fn test_session_marks_current_version_and_pages() {
    let api = Arc::new(ScriptedApi::new(120));
    let dir = project_dir_with(&["survey.qgs"]);
    make_cloud_project(dir.path(), "v17");

    let mut session = HistorySession::open(api, dir.path())
        .await
        .expect("session should open");
    assert_eq!(session.ledger().current_version(), Some(17));
    assert_eq!(session.project().project_full_name(), "fieldwork/survey");

    assert!(session.fetch_older());
    match session.next_event().await.expect("worker delivered no event") {
        FetchEvent::Page(page) => {
            session.apply_page(page).unwrap();
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(session.ledger().newest(), Some(120));
    assert_eq!(session.ledger().oldest(), Some(20));

    // The marked row renders bold in the table projection once reached.
    assert!(session.fetch_older());
    match session.next_event().await.expect("worker delivered no event") {
        FetchEvent::Page(page) => {
            session.apply_page(page).unwrap();
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(session.ledger().oldest(), Some(1));
    assert!(!session.fetch_older());

    let ledger = session.ledger();
    let current_row = (0..ledger.row_count())
        .find(|row| ledger.get(*row).unwrap().name == "v17")
        .expect("v17 should be listed");
    assert!(ledger.cell(current_row, 0).unwrap().bold);
    assert!(!ledger.cell(current_row + 1, 0).unwrap().bold);
}
