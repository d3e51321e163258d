//! Artifact writers and naming.
//!
//! Every tool ends by producing one [`Artifact`]: a file name embedding the UTC
//! date plus the serialized bytes (CSV, XLSX, ZIP or PDF).

use std::io::{Cursor, Write};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{NaiveDate, Utc};
use regex::Regex;
use rust_xlsxwriter::{Workbook, XlsxError};
use zip::ZipWriter;
use zip::write::FileOptions;

use crate::error::{ToolError, ToolResult};
use crate::models::table::format_number;
use crate::models::{Row, TabularFormat};

/// A finished, downloadable result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Write into `dir`, creating it if needed. Returns the full path.
    pub async fn write_to(&self, dir: &Utf8Path) -> ToolResult<Utf8PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ToolError::export(&self.file_name, e))?;

        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes)
            .await
            .map_err(|e| ToolError::export(&self.file_name, e))?;

        tracing::info!("Wrote {} ({} bytes)", path, self.bytes.len());
        Ok(path)
    }
}

/// Builds dated artifact names for every tool.
#[derive(Debug, Clone)]
pub struct ArtifactNamer {
    date: NaiveDate,
    unsafe_chars: Regex,
}

impl ArtifactNamer {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            unsafe_chars: Regex::new(r"[^A-Za-z0-9]").expect("Invalid file name regex"),
        }
    }

    /// Namer for the current UTC date.
    pub fn today() -> Self {
        Self::new(Utc::now().date_naive())
    }

    /// `YYYY-MM-DD`.
    pub fn date_stamp(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Replace every character outside `[A-Za-z0-9]` with `_`.
    pub fn sanitize(&self, text: &str) -> String {
        self.unsafe_chars.replace_all(text, "_").into_owned()
    }

    pub fn serial_sheet(&self) -> String {
        format!("code128_barcodes_{}.pdf", self.date_stamp())
    }

    pub fn pdf417_sheet(&self, caption: &str) -> String {
        let label = if caption.is_empty() {
            "pdf417".to_string()
        } else {
            self.sanitize(caption)
        };
        format!("{}_SNo_{}.pdf", label, self.date_stamp())
    }

    pub fn location_sheet(&self, prefix: &str) -> String {
        format!(
            "location_code128_{}_{}.pdf",
            self.sanitize(prefix),
            self.date_stamp()
        )
    }

    pub fn pallet_sheet(&self, prefix: &str) -> String {
        format!(
            "pallet_{}_barcodes_{}.pdf",
            self.sanitize(prefix),
            self.date_stamp()
        )
    }

    pub fn random_strings(&self, format: TabularFormat) -> String {
        format!(
            "Generated_Strings_{}.{}",
            self.date_stamp(),
            format.extension()
        )
    }

    pub fn split_archive(&self, stem: &str) -> String {
        format!("{}_Split_Files_{}.zip", stem, self.date_stamp())
    }

    /// Name of the `part`-th (1-based) file inside a split archive.
    pub fn split_part(&self, stem: &str, part: usize, format: TabularFormat) -> String {
        format!("{}_Split_{}.{}", stem, part, format.extension())
    }

    pub fn merged(&self) -> String {
        format!("Merged_Files_{}.xlsx", self.date_stamp())
    }

    pub fn unique_data(&self, format: TabularFormat) -> String {
        format!("unique_data_{}.{}", self.date_stamp(), format.extension())
    }

    /// `operation` is `modified` or `concatenated`.
    pub fn column_edit(&self, stem: &str, operation: &str, format: TabularFormat) -> String {
        format!(
            "{}_{}_{}.{}",
            stem,
            operation,
            self.date_stamp(),
            format.extension()
        )
    }
}

/// Quoting used by [`write_csv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvQuoting {
    /// Only fields that need it.
    Necessary,
    /// Every field.
    Always,
}

/// Serialize rows as CSV. Ragged rows are written as they are.
pub fn write_csv(rows: &[Row], quoting: CsvQuoting) -> ToolResult<Vec<u8>> {
    let quote_style = match quoting {
        CsvQuoting::Necessary => csv::QuoteStyle::Necessary,
        CsvQuoting::Always => csv::QuoteStyle::Always,
    };

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .quote_style(quote_style)
        .from_writer(Vec::new());

    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| ToolError::export("CSV", e))?;
    }

    writer
        .into_inner()
        .map_err(|e| ToolError::export("CSV", e.error()))
}

/// Serialize rows into a single-sheet XLSX workbook.
///
/// Cells whose text is exactly how the number would be displayed are written
/// as numbers; everything else (including `001` and `1.50`) stays text.
pub fn write_xlsx(rows: &[Row], sheet_name: &str) -> ToolResult<Vec<u8>> {
    build_xlsx(rows, sheet_name).map_err(|e| ToolError::export(sheet_name, e))
}

fn build_xlsx(rows: &[Row], sheet_name: &str) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = u32::try_from(row_idx).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col_idx, text) in row.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            let col_num = u16::try_from(col_idx).map_err(|_| XlsxError::RowColumnLimitError)?;
            match canonical_number(text) {
                Some(value) => worksheet.write_number(row_num, col_num, value)?,
                None => worksheet.write_string(row_num, col_num, text)?,
            };
        }
    }

    workbook.save_to_buffer()
}

fn canonical_number(text: &str) -> Option<f64> {
    let value = text.parse::<f64>().ok()?;
    (value.is_finite() && format_number(value) == text).then_some(value)
}

/// Serialize rows in `format`.
pub fn write_tabular(rows: &[Row], format: TabularFormat, sheet_name: &str) -> ToolResult<Vec<u8>> {
    match format {
        TabularFormat::Csv => write_csv(rows, CsvQuoting::Necessary),
        TabularFormat::Xlsx => write_xlsx(rows, sheet_name),
    }
}

/// Pack named buffers into a deflated ZIP archive.
pub fn write_zip(entries: &[Artifact]) -> ToolResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in entries {
        zip.start_file(entry.file_name.as_str(), options)
            .map_err(|e| ToolError::export(&entry.file_name, e))?;
        zip.write_all(&entry.bytes)
            .map_err(|e| ToolError::export(&entry.file_name, e))?;
    }

    let cursor = zip.finish().map_err(|e| ToolError::export("ZIP archive", e))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namer() -> ArtifactNamer {
        ArtifactNamer::new(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
    }

    fn rows(data: &[&[&str]]) -> Vec<Row> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_artifact_names() {
        let n = namer();
        assert_eq!(n.serial_sheet(), "code128_barcodes_2024-03-09.pdf");
        assert_eq!(n.pdf417_sheet(""), "pdf417_SNo_2024-03-09.pdf");
        assert_eq!(n.pdf417_sheet("Lot #7"), "Lot__7_SNo_2024-03-09.pdf");
        assert_eq!(n.location_sheet("A-1"), "location_code128_A_1_2024-03-09.pdf");
        assert_eq!(n.pallet_sheet("PLT"), "pallet_PLT_barcodes_2024-03-09.pdf");
        assert_eq!(
            n.random_strings(TabularFormat::Csv),
            "Generated_Strings_2024-03-09.csv"
        );
        assert_eq!(n.split_archive("orders"), "orders_Split_Files_2024-03-09.zip");
        assert_eq!(
            n.split_part("orders", 2, TabularFormat::Xlsx),
            "orders_Split_2.xlsx"
        );
        assert_eq!(n.merged(), "Merged_Files_2024-03-09.xlsx");
        assert_eq!(
            n.unique_data(TabularFormat::Xlsx),
            "unique_data_2024-03-09.xlsx"
        );
        assert_eq!(
            n.column_edit("orders", "modified", TabularFormat::Csv),
            "orders_modified_2024-03-09.csv"
        );
    }

    #[test]
    fn test_sanitize_non_ascii() {
        assert_eq!(namer().sanitize("Größe 1"), "Gr__e_1");
    }

    #[test]
    fn test_write_csv_quoting() {
        let data = rows(&[&["a", "b,c"], &["1"]]);
        let out = write_csv(&data, CsvQuoting::Necessary).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a,\"b,c\"\n1\n");

        let out = write_csv(&rows(&[&["S1", "1"]]), CsvQuoting::Always).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\"S1\",\"1\"\n");
    }

    #[test]
    fn test_canonical_number() {
        assert_eq!(canonical_number("42"), Some(42.0));
        assert_eq!(canonical_number("2.5"), Some(2.5));
        assert_eq!(canonical_number("001"), None);
        assert_eq!(canonical_number("1.50"), None);
        assert_eq!(canonical_number("PLT001"), None);
        assert_eq!(canonical_number("NaN"), None);
    }

    #[test]
    fn test_write_xlsx_is_zip() {
        let bytes = write_xlsx(&rows(&[&["h"], &["1"]]), "Unique Data").unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_write_zip() {
        let entries = vec![
            Artifact::new("a.csv", b"x\n".to_vec()),
            Artifact::new("b.csv", b"y\n".to_vec()),
        ];
        let bytes = write_zip(&entries).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
    }

    #[tokio::test]
    async fn test_write_artifact_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = Utf8PathBuf::from_path_buf(dir.path().join("nested")).unwrap();
        let path = Artifact::new("x.csv", b"1\n".to_vec())
            .write_to(&out)
            .await
            .unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"1\n");
    }
}
