use serde::{Deserialize, Serialize};

use crate::models::config::ToolKind;
use crate::models::table::Table;

/// Supported input file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Csv,
    Xlsx,
    Xls,
}

impl FileKind {
    /// Detect the kind from a file name's extension (case-insensitive).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(FileKind::Csv),
            "xlsx" => Some(FileKind::Xlsx),
            "xls" => Some(FileKind::Xls),
            _ => None,
        }
    }

    pub fn is_excel(&self) -> bool {
        matches!(self, FileKind::Xlsx | FileKind::Xls)
    }
}

/// A parsed input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSource {
    pub file_name: String,
    pub kind: FileKind,
    pub table: Table,
}

impl LoadedSource {
    /// File name without its extension.
    pub fn stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.file_name,
        }
    }
}

/// Severity of a status notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Danger,
}

/// A dismissible notification shown after a tool action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub message: String,
}

impl StatusMessage {
    pub fn new(level: StatusLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Danger, message)
    }
}

/// Name and size of the most recent downloadable result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub file_name: String,
    pub size: usize,
}

/// Everything a tool works on between user actions.
///
/// Wrapped by [`SessionManager`](crate::state::SessionManager); handlers never
/// hold a `Session` across an await point of another handler.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub active_tool: Option<ToolKind>,
    pub source: Option<LoadedSource>,

    /// Derived items in presentation order; `""` is a layout gap.
    pub items: Vec<String>,

    /// Column indices chosen by the user, in selection order.
    pub selected_columns: Vec<usize>,

    pub status: Option<StatusMessage>,
    pub last_artifact: Option<ArtifactInfo>,
}

impl Session {
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Number of non-empty items.
    pub fn item_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_empty()).count()
    }

    /// Drop everything derived from the current source.
    pub fn reset(&mut self) {
        self.source = None;
        self.items.clear();
        self.selected_columns.clear();
        self.status = None;
        self.last_artifact = None;
    }
}
