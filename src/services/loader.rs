//! File loading: CSV and Excel buffers into [`Table`]s.
//!
//! Cells are coerced to text on the way in. CSV bytes are decoded as UTF-8 per
//! field and fall back to Windows-1252 (what Excel writes on Windows); a leading
//! UTF-8 BOM is dropped. Workbooks contribute their first sheet only.

use std::borrow::Cow;
use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use camino::Utf8Path;
use csv::ByteRecord;
use encoding_rs::WINDOWS_1252;

use crate::error::{ToolError, ToolResult};
use crate::models::table::format_number;
use crate::models::{FileKind, LoadedSource, Row, Table};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Detect the file kind from `file_name` or fail with a user-facing message.
pub fn detect_kind(file_name: &str) -> ToolResult<FileKind> {
    FileKind::from_file_name(file_name).ok_or_else(|| {
        ToolError::invalid_config("Please select a valid Excel (.xlsx, .xls) or CSV (.csv) file.")
    })
}

/// Parse CSV bytes. Every record becomes a row; ragged rows are kept as-is.
///
/// Blank lines become empty rows in place, since some tools treat them as
/// separators. A line terminator at the very end does not start a row.
pub fn parse_csv(file_name: &str, bytes: &[u8]) -> ToolResult<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).flexible(true);

    let mut rows: Vec<Row> = Vec::new();
    let mut record = ByteRecord::new();

    for span in record_spans(bytes) {
        if span.is_empty() {
            rows.push(Row::new());
            continue;
        }

        let mut reader = builder.from_reader(span);
        while reader
            .read_byte_record(&mut record)
            .map_err(|e| ToolError::parse(file_name, e))?
        {
            rows.push(decode_record(&record));
        }
    }

    Ok(Table::new(rows))
}

/// Split CSV bytes into physical records, without their terminators.
///
/// `\n`, `\r\n` and a lone `\r` end a record unless they sit inside a quoted
/// field. A quote only opens a quoted field at the start of a field, and `""`
/// inside one is an escaped quote, matching how the csv reader tokenizes.
fn record_spans(bytes: &[u8]) -> Vec<&[u8]> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut field_start = true;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_quotes {
            if b == b'"' {
                if bytes.get(i + 1) == Some(&b'"') {
                    i += 1;
                } else {
                    in_quotes = false;
                }
            }
        } else {
            match b {
                b'"' if field_start => {
                    in_quotes = true;
                    field_start = false;
                }
                b',' => field_start = true,
                b'\n' | b'\r' => {
                    spans.push(&bytes[start..i]);
                    if b == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    start = i + 1;
                    field_start = true;
                }
                _ => field_start = false,
            }
        }
        i += 1;
    }

    if start < bytes.len() {
        spans.push(&bytes[start..]);
    }
    spans
}

fn decode_record(record: &ByteRecord) -> Row {
    record
        .iter()
        .map(|field| decode_field(field).into_owned())
        .collect()
}

fn decode_field(field: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(field) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (cow, _, _) = WINDOWS_1252.decode(field);
            cow
        }
    }
}

/// Parse the first sheet of an `.xlsx` or `.xls` workbook.
///
/// Leading empty columns are kept as empty cells so column indices match what a
/// spreadsheet shows; trailing empty cells of each row are dropped.
pub fn parse_workbook(file_name: &str, bytes: &[u8]) -> ToolResult<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ToolError::parse(file_name, e))?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Ok(Table::default());
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ToolError::parse(file_name, e))?;

    let leading = range.start().map_or(0, |(_, col)| col as usize);

    let rows = range
        .rows()
        .map(|cells| {
            let mut row: Row = vec![String::new(); leading];
            row.extend(cells.iter().map(cell_text));
            while row.last().is_some_and(|c| c.is_empty()) {
                row.pop();
            }
            row
        })
        .collect();

    Ok(Table::new(rows))
}

/// Text shown for a spreadsheet cell.
fn cell_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

/// Parse an in-memory file according to its extension.
pub fn load_bytes(file_name: &str, bytes: &[u8]) -> ToolResult<LoadedSource> {
    let kind = detect_kind(file_name)?;
    let table = match kind {
        FileKind::Csv => parse_csv(file_name, bytes)?,
        FileKind::Xlsx | FileKind::Xls => parse_workbook(file_name, bytes)?,
    };

    tracing::info!(
        "Loaded {} ({:?}): {} rows, {} columns",
        file_name,
        kind,
        table.len(),
        table.column_count()
    );

    Ok(LoadedSource {
        file_name: file_name.to_string(),
        kind,
        table,
    })
}

/// Read and parse a file from disk.
pub async fn load_file(path: &Utf8Path) -> ToolResult<LoadedSource> {
    let file_name = path.file_name().unwrap_or(path.as_str());
    detect_kind(file_name)?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ToolError::FileRead {
            path: path.to_string(),
            source,
        })?;

    load_bytes(file_name, &bytes)
}
