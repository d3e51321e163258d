use serde::{Deserialize, Serialize};

/// One row of text cells.
///
/// Numeric and blank cells are coerced to text when the row is loaded, so a
/// blank cell is simply the empty string.
pub type Row = Vec<String>;

/// Ordered rows loaded from a CSV or Excel source.
///
/// Whether the first row is a header depends on the tool; helpers that treat
/// it as one say so in their name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row, if any.
    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Every row after the header.
    pub fn data_rows(&self) -> &[Row] {
        if self.rows.is_empty() {
            &[]
        } else {
            &self.rows[1..]
        }
    }

    /// Number of rows excluding the header.
    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Display name for a column: the header text, or `Column N` when blank.
    pub fn column_name(&self, index: usize) -> String {
        match self.header().and_then(|h| h.get(index)) {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("Column {}", index + 1),
        }
    }

    /// Widest row in the table.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Copy of the table without rows whose cells are all blank.
    pub fn without_blank_rows(&self) -> Table {
        Table {
            rows: self
                .rows
                .iter()
                .filter(|row| !is_blank_row(row))
                .cloned()
                .collect(),
        }
    }

    /// First cell of every row, `""` for rows with no cells.
    pub fn first_column(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.first().cloned().unwrap_or_default())
            .collect()
    }
}

impl From<Vec<Row>> for Table {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

/// Cell text at `index`, `""` when the row is shorter.
pub fn cell(row: &Row, index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// True when every cell trims to nothing.
pub fn is_blank_row(row: &Row) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Format a spreadsheet number the way a spreadsheet displays it in a text
/// context: integral values lose their fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
