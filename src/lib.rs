// labelkit - tabular data tools for labels and spreadsheets
//
// This is the library crate containing the tool pipelines and data structures.
// The binary crate (main.rs) runs job files through the Workbench.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod workbench;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use error::{ToolError, ToolResult};
pub use metrics::Metrics;
pub use models::{JobConfig, Session, StatusMessage, ToolKind, ToolSettings, UserConfig};
pub use state::{SessionChange, SessionManager};
pub use workbench::Workbench;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
