// Session state module
//
// This module provides the SessionManager, which owns the Session a tool works on
// and emits change events whenever a handler mutates it.

use crate::models::{ArtifactInfo, LoadedSource, Session, StatusMessage, ToolKind};
use tokio::sync::broadcast;

/// Change events emitted when the session is modified
///
/// Listeners (the job runner, tests) use these instead of polling the session.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionChange {
    /// A new source file replaced the previous one
    SourceLoaded {
        file_name: String,
        rows: usize,
    },

    /// The derived item list was replaced
    ItemsChanged {
        count: usize,
    },

    /// The user picked a different set of columns
    ColumnsSelected {
        columns: Vec<usize>,
    },

    /// A status notification was posted
    StatusPosted(StatusMessage),

    /// A downloadable result is ready
    ArtifactReady {
        file_name: String,
        size: usize,
    },

    /// Everything derived from the source was dropped
    SessionCleared,
}

/// Owner of the [`Session`] with event emission
///
/// Handlers run one at a time on a single-threaded runtime, so mutation goes
/// through `&mut self` rather than a lock: the borrow checker guarantees only the
/// active handler can touch the session.
///
/// - [`read()`](Self::read) for reading state
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to changes
pub struct SessionManager {
    session: Session,

    /// Broadcast channel for emitting change events
    change_tx: broadcast::Sender<SessionChange>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    /// Create a manager with an empty session and a 100-event channel buffer
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(100);
        Self {
            session: Session::default(),
            change_tx,
        }
    }

    /// Clone of the current session
    pub fn snapshot(&self) -> Session {
        self.session.clone()
    }

    /// Execute a function with read access to the session
    ///
    /// # Example
    /// ```ignore
    /// let count = manager.read(|session| session.item_count());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Session) -> R,
    {
        f(&self.session)
    }

    /// Update the session and emit change events
    ///
    /// Captures the old session, applies `update_fn`, diffs the two and sends
    /// one event per detected change. Returns the emitted events.
    pub fn update<F>(&mut self, update_fn: F) -> Vec<SessionChange>
    where
        F: FnOnce(&mut Session),
    {
        let old = self.session.clone();
        update_fn(&mut self.session);

        let changes = detect_changes(&old, &self.session);
        for change in &changes {
            // No listeners is fine
            let _ = self.change_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to change events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.change_tx.subscribe()
    }

    // Convenience methods for common updates

    /// Switch tools. Switching drops everything derived from the previous tool.
    pub fn activate(&mut self, tool: ToolKind) -> Vec<SessionChange> {
        self.update(|session| {
            if session.active_tool != Some(tool) {
                session.reset();
                session.active_tool = Some(tool);
            }
        })
    }

    /// Replace the source file; items and column selection derived from the old one are dropped
    pub fn load_source(&mut self, source: LoadedSource) -> Vec<SessionChange> {
        self.update(|session| {
            session.source = Some(source);
            session.items.clear();
            session.selected_columns.clear();
            session.last_artifact = None;
        })
    }

    pub fn set_items(&mut self, items: Vec<String>) -> Vec<SessionChange> {
        self.update(|session| session.items = items)
    }

    pub fn select_columns(&mut self, columns: Vec<usize>) -> Vec<SessionChange> {
        self.update(|session| session.selected_columns = columns)
    }

    pub fn post_status(&mut self, status: StatusMessage) -> Vec<SessionChange> {
        match status.level {
            crate::models::StatusLevel::Danger => tracing::error!("{}", status.message),
            crate::models::StatusLevel::Warning => tracing::warn!("{}", status.message),
            _ => tracing::info!("{}", status.message),
        }
        self.update(|session| session.status = Some(status))
    }

    pub fn record_artifact(&mut self, file_name: String, size: usize) -> Vec<SessionChange> {
        self.update(|session| session.last_artifact = Some(ArtifactInfo { file_name, size }))
    }

    /// Drop the source and everything derived from it
    pub fn clear(&mut self) -> Vec<SessionChange> {
        self.update(Session::reset)
    }
}

/// True when nothing but the active tool is set
fn is_blank(session: &Session) -> bool {
    session.source.is_none()
        && session.items.is_empty()
        && session.selected_columns.is_empty()
        && session.status.is_none()
        && session.last_artifact.is_none()
}

/// Work out which events describe the step from `old` to `new`
fn detect_changes(old: &Session, new: &Session) -> Vec<SessionChange> {
    let mut changes = Vec::new();

    if is_blank(new) && !is_blank(old) {
        changes.push(SessionChange::SessionCleared);
        return changes;
    }

    if let Some(source) = &new.source {
        if old.source.as_ref() != Some(source) {
            changes.push(SessionChange::SourceLoaded {
                file_name: source.file_name.clone(),
                rows: source.table.len(),
            });
        }
    }

    if old.items != new.items {
        changes.push(SessionChange::ItemsChanged {
            count: new.items.len(),
        });
    }

    if old.selected_columns != new.selected_columns {
        changes.push(SessionChange::ColumnsSelected {
            columns: new.selected_columns.clone(),
        });
    }

    if let Some(status) = &new.status {
        if old.status.as_ref() != Some(status) {
            changes.push(SessionChange::StatusPosted(status.clone()));
        }
    }

    if let Some(artifact) = &new.last_artifact {
        if old.last_artifact.as_ref() != Some(artifact) {
            changes.push(SessionChange::ArtifactReady {
                file_name: artifact.file_name.clone(),
                size: artifact.size,
            });
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileKind, Table};

    fn source(name: &str) -> LoadedSource {
        LoadedSource {
            file_name: name.to_string(),
            kind: FileKind::Csv,
            table: Table::new(vec![vec!["h".to_string()], vec!["1".to_string()]]),
        }
    }

    #[test]
    fn test_load_source_emits_event() {
        let mut manager = SessionManager::new();
        let changes = manager.load_source(source("a.csv"));
        assert_eq!(
            changes,
            vec![SessionChange::SourceLoaded {
                file_name: "a.csv".to_string(),
                rows: 2
            }]
        );
    }

    #[test]
    fn test_reloading_same_source_is_silent() {
        let mut manager = SessionManager::new();
        manager.load_source(source("a.csv"));
        assert!(manager.load_source(source("a.csv")).is_empty());
    }

    #[test]
    fn test_items_and_columns() {
        let mut manager = SessionManager::new();
        let changes = manager.set_items(vec!["A".to_string(), String::new()]);
        assert_eq!(changes, vec![SessionChange::ItemsChanged { count: 2 }]);

        let changes = manager.select_columns(vec![2, 0]);
        assert_eq!(
            changes,
            vec![SessionChange::ColumnsSelected {
                columns: vec![2, 0]
            }]
        );
        assert_eq!(manager.read(|s| s.item_count()), 1);
    }

    #[test]
    fn test_clear() {
        let mut manager = SessionManager::new();
        manager.load_source(source("a.csv"));
        manager.set_items(vec!["A".to_string()]);

        let changes = manager.clear();
        assert_eq!(changes, vec![SessionChange::SessionCleared]);
        assert!(!manager.read(|s| s.has_source()));
    }

    #[test]
    fn test_activate_resets_on_switch() {
        let mut manager = SessionManager::new();
        manager.activate(ToolKind::Dedup);
        manager.load_source(source("a.csv"));

        assert!(manager.activate(ToolKind::Dedup).is_empty());
        assert!(manager.read(|s| s.has_source()));

        manager.activate(ToolKind::Split);
        assert!(!manager.read(|s| s.has_source()));
        assert_eq!(manager.read(|s| s.active_tool), Some(ToolKind::Split));
    }

    #[tokio::test]
    async fn test_subscribe_receives_status() {
        let mut manager = SessionManager::new();
        let mut rx = manager.subscribe();

        manager.post_status(StatusMessage::success("done"));
        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            SessionChange::StatusPosted(StatusMessage::success("done"))
        );
    }
}
