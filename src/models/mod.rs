//! Data models for labelkit.
//!
//! - [`Table`] and [`Row`]: tabular data as text cells
//! - [`LayoutGeometry`] and [`PagePosition`]: page/grid sizing and derived item placement
//! - [`UserConfig`] and [`JobConfig`]: settings from `labelkit Settings.yaml` and per-run job files
//! - [`Session`]: the state a tool works on, owned by [`SessionManager`](crate::state::SessionManager)
//!
//! Config records derive `Serialize`/`Deserialize` for YAML persistence. Session
//! updates go through the manager's `update()` so change events stay consistent.

pub mod config;
pub mod layout;
pub mod session;
pub mod table;

pub use config::{
    AffixPosition, ColumnAffix, ColumnEdit, DedupMode, HeaderPlacement, JobConfig,
    LocationSheetConfig, MergeConfig, MergeHeaderMode, PalletSheetConfig, Pdf417SheetConfig,
    RandomStringsConfig, SerialSheetConfig, SplitConfig, TabularFormat, ToolKind, ToolSettings,
    UserConfig,
};
pub use layout::{LayoutGeometry, PagePosition};
pub use session::{ArtifactInfo, FileKind, LoadedSource, Session, StatusLevel, StatusMessage};
pub use table::{Row, Table};
