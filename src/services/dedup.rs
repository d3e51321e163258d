//! Duplicate row removal.
//!
//! The first row is the header and is always kept. Every later row is reduced to a
//! [`DedupKey`]; the first row with a given key survives, later ones are dropped.

use std::collections::HashSet;

use crate::error::{ToolError, ToolResult};
use crate::models::{DedupMode, Row, Table};

/// Comparable key derived from a row. A pure function of the row and the mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey(String);

impl DedupKey {
    /// Derive the key for `row`.
    ///
    /// All columns: every positional cell, so `["a", ""]` and `["a"]` differ.
    /// Specific columns: a cell past the end of the row is `null`, distinct
    /// from an empty cell.
    pub fn derive(row: &Row, mode: &DedupMode) -> Self {
        // A JSON array cannot collide across different cell splits.
        let key = match mode {
            DedupMode::AllColumns => serde_json::to_string(row),
            DedupMode::SpecificColumns { columns } => {
                let cells: Vec<Option<&str>> = columns
                    .iter()
                    .map(|&index| row.get(index).map(String::as_str))
                    .collect();
                serde_json::to_string(&cells)
            }
        };
        Self(key.unwrap_or_else(|_| format!("{:?}", row)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of [`remove_duplicates`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupOutcome {
    /// Header followed by the unique data rows, in original order.
    pub table: Table,
    pub duplicate_count: usize,
    pub original_data_rows: usize,
}

impl DedupOutcome {
    pub fn unique_data_rows(&self) -> usize {
        self.table.data_row_count()
    }

    /// Status text shown after a run.
    pub fn summary(&self) -> String {
        let headline = if self.duplicate_count > 0 {
            format!("Removed {} duplicate row(s).", self.duplicate_count)
        } else {
            "No duplicate rows found.".to_string()
        };
        format!(
            "{} Original data rows: {} | Final unique data rows: {}",
            headline,
            self.original_data_rows,
            self.unique_data_rows()
        )
    }
}

/// Remove duplicate data rows from `table`.
pub fn remove_duplicates(table: &Table, mode: &DedupMode) -> ToolResult<DedupOutcome> {
    if matches!(mode, DedupMode::SpecificColumns { columns } if columns.is_empty()) {
        return Err(ToolError::invalid_config(
            "Please select at least one column to check for duplicates.",
        ));
    }

    let Some(header) = table.header() else {
        return Err(ToolError::EmptyDataset(
            "File must have at least one header and one data row.".to_string(),
        ));
    };

    let data = table.data_rows();
    let mut seen: HashSet<DedupKey> = HashSet::with_capacity(data.len());
    let mut rows = Vec::with_capacity(data.len() + 1);
    rows.push(header.clone());

    for row in data {
        if seen.insert(DedupKey::derive(row, mode)) {
            rows.push(row.clone());
        }
    }

    let outcome = DedupOutcome {
        duplicate_count: data.len() - (rows.len() - 1),
        original_data_rows: data.len(),
        table: Table::new(rows),
    };

    tracing::info!(
        "Dedup: {} data rows, {} duplicates removed",
        outcome.original_data_rows,
        outcome.duplicate_count
    );

    Ok(outcome)
}
