//! Row-level tools: split, merge, and column edits.

use crate::error::{ToolError, ToolResult};
use crate::models::config::MAX_MERGE_FILES;
use crate::models::{
    AffixPosition, ColumnAffix, HeaderPlacement, LoadedSource, MergeHeaderMode, Row, Table,
};

/// Split the data rows of `table` into chunks of `rows_per_file`.
///
/// With [`HeaderPlacement::Include`] every chunk starts with the header.
pub fn split_rows(
    table: &Table,
    rows_per_file: usize,
    header: HeaderPlacement,
) -> ToolResult<Vec<Vec<Row>>> {
    if rows_per_file == 0 {
        return Err(ToolError::invalid_config("Please enter a valid row count."));
    }
    if table.len() < 2 {
        return Err(ToolError::EmptyDataset(
            "File must have at least one header and one data row.".to_string(),
        ));
    }

    let header_row = table.header().cloned().unwrap_or_default();
    let chunks = table
        .data_rows()
        .chunks(rows_per_file)
        .map(|chunk| {
            let mut rows = Vec::with_capacity(chunk.len() + 1);
            if header == HeaderPlacement::Include {
                rows.push(header_row.clone());
            }
            rows.extend_from_slice(chunk);
            rows
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        "Split {} data rows into {} files of up to {} rows",
        table.data_row_count(),
        chunks.len(),
        rows_per_file
    );

    Ok(chunks)
}

/// Concatenate the rows of every source, in order.
///
/// Empty sources are skipped. With [`MergeHeaderMode::FirstFileOnly`] the first
/// row of every source after the first is dropped.
pub fn merge_tables(sources: &[LoadedSource], mode: MergeHeaderMode) -> ToolResult<Table> {
    if sources.len() < 2 {
        return Err(ToolError::invalid_config(
            "Please select at least 2 files to merge.",
        ));
    }
    if sources.len() > MAX_MERGE_FILES {
        return Err(ToolError::invalid_config(format!(
            "Maximum {} files allowed.",
            MAX_MERGE_FILES
        )));
    }

    let mut rows = Vec::new();
    for (index, source) in sources.iter().enumerate() {
        if source.table.is_empty() {
            tracing::debug!("Skipping empty file {}", source.file_name);
            continue;
        }

        let skip = match mode {
            MergeHeaderMode::FirstFileOnly if index > 0 => 1,
            _ => 0,
        };
        rows.extend(source.table.rows.iter().skip(skip).cloned());
    }

    tracing::info!("Merged {} files into {} rows", sources.len(), rows.len());
    Ok(Table::new(rows))
}

/// Add prefixes or suffixes to columns of every data row.
///
/// Affixes with blank text are ignored, and empty or missing cells are left
/// untouched.
pub fn modify_columns(table: &Table, affixes: &[ColumnAffix]) -> ToolResult<Table> {
    if affixes.is_empty() {
        return Err(ToolError::invalid_config(
            "Please upload a file and select columns!",
        ));
    }

    let mut rows = table.rows.clone();
    for row in rows.iter_mut().skip(1) {
        for affix in affixes {
            if affix.text.trim().is_empty() {
                continue;
            }
            let Some(cell) = row.get_mut(affix.column) else {
                continue;
            };
            if cell.is_empty() {
                continue;
            }
            *cell = match affix.position {
                AffixPosition::Start => format!("{}{}", affix.text, cell),
                AffixPosition::End => format!("{}{}", cell, affix.text),
            };
        }
    }

    Ok(Table::new(rows))
}

/// Append a column joining the selected columns of every data row.
///
/// The separator follows every non-empty value except one taken from the last
/// selected column. Rows shorter than the header are padded so the new cell
/// lands under the new header.
pub fn concatenate_columns(
    table: &Table,
    columns: &[usize],
    separator: &str,
    new_column_name: &str,
) -> ToolResult<Table> {
    if columns.is_empty() {
        return Err(ToolError::invalid_config(
            "Please upload a file and select columns!",
        ));
    }
    if new_column_name.trim().is_empty() {
        return Err(ToolError::invalid_config(
            "Please enter a name for the new column.",
        ));
    }
    let Some(header) = table.header() else {
        return Err(ToolError::EmptyDataset(
            "File must have at least one header and one data row.".to_string(),
        ));
    };

    let width = header.len();
    let mut rows = Vec::with_capacity(table.len());

    let mut new_header = header.clone();
    new_header.push(new_column_name.to_string());
    rows.push(new_header);

    for row in table.data_rows() {
        let mut joined = String::new();
        for (i, &column) in columns.iter().enumerate() {
            let value = crate::models::table::cell(row, column);
            if !value.is_empty() {
                joined.push_str(value);
                if i < columns.len() - 1 {
                    joined.push_str(separator);
                }
            }
        }

        let mut out = row.clone();
        if out.len() < width {
            out.resize(width, String::new());
        }
        out.push(joined);
        rows.push(out);
    }

    Ok(Table::new(rows))
}
