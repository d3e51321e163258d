use thiserror::Error;

use crate::models::StatusLevel;

/// Errors that can occur while loading, transforming, or exporting data
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse {file}: {reason}")]
    Parse { file: String, reason: String },

    #[error("{0}")]
    EmptyDataset(String),

    #[error("{0}")]
    InvalidConfig(String),

    #[error("Barcode rendering failed for {text:?}: {reason}")]
    Render { text: String, reason: String },

    #[error("Failed to write {artifact}: {reason}")]
    Export { artifact: String, reason: String },
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;

impl ToolError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn parse(file: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    pub fn export(artifact: impl Into<String>, reason: impl ToString) -> Self {
        Self::Export {
            artifact: artifact.into(),
            reason: reason.to_string(),
        }
    }

    /// Severity used when the error is surfaced as a status notification.
    ///
    /// Input problems the user can fix in place are warnings; everything else is danger.
    pub fn status_level(&self) -> StatusLevel {
        match self {
            ToolError::EmptyDataset(_) | ToolError::InvalidConfig(_) => StatusLevel::Warning,
            _ => StatusLevel::Danger,
        }
    }
}
