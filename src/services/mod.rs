//! Services module - the tool pipelines, free of session and UI concerns.
//!
//! Each tool is a linear pipeline built from these pieces:
//!
//! - [`loader`]: CSV/XLSX/XLS bytes into a [`Table`](crate::models::Table)
//! - [`grouping`], [`dedup`], [`identifiers`], [`tabular`]: the transformers
//!   that turn rows into items or new rows
//! - [`barcode`]: symbol rendering behind the [`SymbolRenderer`] trait
//! - [`layout`]: pagination of rendered items onto fixed-size pages
//! - [`document`] and [`export`]: PDF, CSV, XLSX and ZIP writers plus artifact naming
//!
//! Everything here is deterministic given its inputs except the random
//! identifier generators. Errors are [`ToolError`](crate::error::ToolError)s;
//! turning them into status messages is the [`Workbench`](crate::workbench::Workbench)'s job.
//!
//! # Usage Example
//!
//! ```ignore
//! use labelkit::services::{grouping, layout::Paginator};
//!
//! let items = grouping::group_values(&values, 5, &base)?;
//! let paginator = Paginator::new(geometry)?;
//! for (i, _) in items.iter().enumerate() {
//!     let pos = paginator.position(i);
//! }
//! ```

pub mod barcode;
pub mod dedup;
pub mod document;
pub mod export;
pub mod grouping;
pub mod identifiers;
pub mod layout;
pub mod loader;
pub mod tabular;

pub use barcode::{
    BarcodeRaster, Preview, RenderReport, RenderRequest, RenderedItem, RxingRenderer,
    SymbolRenderer, Symbology,
};
pub use dedup::{DedupKey, DedupOutcome, remove_duplicates};
pub use document::{CaptionStyle, CaptionText, Placement};
pub use export::{Artifact, ArtifactNamer};
pub use grouping::{group_values, substitute_template};
pub use identifiers::RotationSchedule;
pub use layout::{Paginator, paginate};
pub use loader::{load_bytes, load_file};
