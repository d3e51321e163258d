//! Integration tests for SessionManager with session change events
//!
//! These tests verify that the SessionManager correctly:
//! - Emits change events on mutations
//! - Supports multiple subscribers
//! - Drops derived state when the source or tool changes

use labelkit::models::{FileKind, LoadedSource, StatusMessage, Table, ToolKind};
use labelkit::{SessionChange, SessionManager};
use tokio::time::{Duration, timeout};

fn source(name: &str, rows: usize) -> LoadedSource {
    LoadedSource {
        file_name: name.to_string(),
        kind: FileKind::Csv,
        table: Table::new((0..rows).map(|i| vec![i.to_string()]).collect()),
    }
}

#[tokio::test]
async fn test_source_loaded_event_emitted() {
    let mut manager = SessionManager::new();
    let mut rx = manager.subscribe();

    manager.load_source(source("serials.csv", 4));

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");

    assert_eq!(
        event,
        SessionChange::SourceLoaded {
            file_name: "serials.csv".to_string(),
            rows: 4
        }
    );
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let mut manager = SessionManager::new();
    let mut rx1 = manager.subscribe();
    let mut rx2 = manager.subscribe();

    manager.set_items(vec!["A".to_string(), "B".to_string()]);

    for rx in [&mut rx1, &mut rx2] {
        let event = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout waiting for event")
            .expect("Channel closed");
        assert_eq!(event, SessionChange::ItemsChanged { count: 2 });
    }
}

#[test]
fn test_new_source_drops_derived_state() {
    let mut manager = SessionManager::new();
    manager.load_source(source("a.csv", 2));
    manager.set_items(vec!["x".to_string()]);
    manager.select_columns(vec![1]);
    manager.record_artifact("out.pdf".to_string(), 10);

    let changes = manager.load_source(source("b.csv", 3));

    assert!(changes.contains(&SessionChange::SourceLoaded {
        file_name: "b.csv".to_string(),
        rows: 3
    }));
    assert!(changes.contains(&SessionChange::ItemsChanged { count: 0 }));
    manager.read(|s| {
        assert!(s.items.is_empty());
        assert!(s.selected_columns.is_empty());
        assert!(s.last_artifact.is_none());
    });
}

#[test]
fn test_update_reports_multiple_changes() {
    let mut manager = SessionManager::new();
    let changes = manager.update(|s| {
        s.items = vec!["1".to_string()];
        s.status = Some(StatusMessage::warning("careful"));
    });

    assert_eq!(
        changes,
        vec![
            SessionChange::ItemsChanged { count: 1 },
            SessionChange::StatusPosted(StatusMessage::warning("careful")),
        ]
    );
}

#[test]
fn test_switching_tools_clears_session() {
    let mut manager = SessionManager::new();
    manager.activate(ToolKind::SerialSheet);
    manager.load_source(source("a.csv", 2));

    let changes = manager.activate(ToolKind::Merge);
    assert_eq!(changes, vec![SessionChange::SessionCleared]);
    assert_eq!(manager.snapshot().active_tool, Some(ToolKind::Merge));
}

#[test]
fn test_clearing_empty_session_is_silent() {
    let mut manager = SessionManager::new();
    assert!(manager.clear().is_empty());
}
