//! Integration tests for the Workbench tool handlers
//!
//! A fake symbol renderer keeps these independent of real barcode encoding.
//! These tests verify:
//! - Every tool produces its artifact with the dated name
//! - Errors become status messages instead of failing the caller
//! - Job files run end to end and write into the output directory

use std::io::{Cursor, Read};

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use labelkit::models::{
    ColumnEdit, DedupMode, HeaderPlacement, JobConfig, LoadedSource, LocationSheetConfig,
    MergeConfig, MergeHeaderMode, PalletSheetConfig, Pdf417SheetConfig, RandomStringsConfig,
    SplitConfig, StatusLevel, TabularFormat,
};
use labelkit::services::barcode::{BarcodeRaster, SymbolRenderer, Symbology};
use labelkit::services::{ArtifactNamer, load_bytes};
use labelkit::{SessionChange, ToolResult, ToolSettings, Workbench};
use tempfile::TempDir;

struct StripeRenderer;

impl SymbolRenderer for StripeRenderer {
    fn render(&self, _: Symbology, _: &str, _: u32, _: u32) -> ToolResult<BarcodeRaster> {
        BarcodeRaster::new(3, 1, vec![true, false, true])
    }
}

fn workbench() -> Workbench {
    Workbench::with_renderer(ToolSettings::default(), Box::new(StripeRenderer))
        .with_namer(ArtifactNamer::new(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()))
}

fn csv(name: &str, text: &str) -> LoadedSource {
    load_bytes(name, text.as_bytes()).unwrap()
}

fn zip_entry(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    text
}

#[tokio::test]
async fn test_pdf417_sheet_keeps_gaps() {
    let mut wb = workbench();
    let config = Pdf417SheetConfig {
        group_size: 2,
        base_template: "PN={Part Number};".to_string(),
        part_number: "X1".to_string(),
        caption: "Lot 7".to_string(),
        ..Default::default()
    };
    let source = csv("serials.csv", "a\nb\nc\n\nd\n");

    let artifact = wb.pdf417_sheet(source, &config).await.unwrap();
    assert_eq!(artifact.file_name, "Lot_7_SNo_2024-03-09.pdf");
    assert!(artifact.bytes.starts_with(b"%PDF"));

    let items = wb.sessions().read(|s| s.items.clone());
    assert_eq!(items, vec!["PN=X1;a,b", "PN=X1;c", "", "PN=X1;d"]);

    let preview = wb.preview(Symbology::Pdf417, 2, 1);
    assert_eq!(preview.items.len(), 1);
    assert_eq!(preview.total, 3);
    assert!(preview.note().unwrap().starts_with("Showing 1 of 3 barcodes"));
}

#[tokio::test]
async fn test_location_sheet_events() {
    let mut wb = workbench();
    let mut rx = wb.subscribe();
    let config = LocationSheetConfig {
        prefix: " A-1 ".to_string(),
        count: 3,
        ..Default::default()
    };

    let artifact = wb.location_sheet(&config).await.unwrap();
    assert_eq!(artifact.file_name, "location_code128_A_1_2024-03-09.pdf");
    assert_eq!(
        wb.sessions().read(|s| s.items.clone()),
        vec!["A-1001", "A-1002", "A-1003"]
    );

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert!(events.contains(&SessionChange::ItemsChanged { count: 3 }));
    assert!(events.contains(&SessionChange::ArtifactReady {
        file_name: artifact.file_name.clone(),
        size: artifact.bytes.len(),
    }));
    assert_eq!(
        wb.status().unwrap().message,
        "PDF generated successfully: location_code128_A_1_2024-03-09.pdf"
    );
}

#[tokio::test]
async fn test_pallet_prefix_too_long() {
    let mut wb = workbench();
    let config = PalletSheetConfig {
        prefix: "PALLET".to_string(),
        total_length: 6,
        ..Default::default()
    };

    assert!(wb.pallet_sheet(&config).await.is_none());
    let status = wb.status().unwrap();
    assert_eq!(status.level, StatusLevel::Warning);
    assert_eq!(status.message, "Prefix length must be less than Total Length.");
    assert!(wb.sessions().read(|s| s.last_artifact.is_none()));
}

#[tokio::test]
async fn test_random_strings_csv_quotes_everything() {
    let mut wb = workbench();
    let config = RandomStringsConfig {
        count: 12,
        box_id_interval: 5,
        format: TabularFormat::Csv,
        ..Default::default()
    };

    let artifact = wb.random_strings(&config).await.unwrap();
    assert_eq!(artifact.file_name, "Generated_Strings_2024-03-09.csv");

    let text = String::from_utf8(artifact.bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 13);
    assert_eq!(
        lines[0],
        "\"Serial Number (With S)\",\"Serial Number (Without S)\",\"Box ID\""
    );
    assert!(lines[1].starts_with("\"S"));
    assert!(wb.status().unwrap().message.starts_with("Successfully generated 12 serials in"));
}

#[tokio::test]
async fn test_split_csv_into_zip() {
    let mut wb = workbench();
    let source = csv("orders.csv", "id,qty\n1,a\n\n2,b\n3,c\n");
    let config = SplitConfig {
        rows_per_file: 2,
        header: HeaderPlacement::Include,
    };

    let artifact = wb.split(source, &config).await.unwrap();
    assert_eq!(artifact.file_name, "orders_Split_Files_2024-03-09.zip");
    assert_eq!(
        zip_entry(&artifact.bytes, "orders_Split_1.csv"),
        "id,qty\n1,a\n2,b\n"
    );
    assert_eq!(zip_entry(&artifact.bytes, "orders_Split_2.csv"), "id,qty\n3,c\n");
}

#[tokio::test]
async fn test_merge_first_file_only() {
    let mut wb = workbench();
    let sources = vec![
        csv("a.csv", "name,qty\nx,1\n"),
        csv("empty.csv", ""),
        csv("b.csv", "name,qty\ny,2\n"),
    ];
    let config = MergeConfig {
        header: MergeHeaderMode::FirstFileOnly,
    };

    let artifact = wb.merge(sources, &config).await.unwrap();
    assert_eq!(artifact.file_name, "Merged_Files_2024-03-09.xlsx");

    let merged = load_bytes(&artifact.file_name, &artifact.bytes).unwrap();
    assert_eq!(merged.table.first_column(), vec!["name", "x", "y"]);
    assert_eq!(merged.table.rows[2], vec!["y", "2"]);
}

#[tokio::test]
async fn test_merge_needs_two_files() {
    let mut wb = workbench();
    let sources = vec![csv("a.csv", "h\n1\n")];
    assert!(wb.merge(sources, &MergeConfig::default()).await.is_none());
    assert_eq!(
        wb.status().unwrap().message,
        "Please select at least 2 files to merge."
    );
}

#[tokio::test]
async fn test_dedup_csv_output() {
    let mut wb = workbench();
    let source = csv("data.csv", "h,v\n1,a\n\n1,a\n2,b\n");

    let artifact = wb.dedup(source, &DedupMode::AllColumns).await.unwrap();
    assert_eq!(artifact.file_name, "unique_data_2024-03-09.csv");
    assert_eq!(String::from_utf8(artifact.bytes).unwrap(), "h,v\n1,a\n2,b\n");
    assert_eq!(
        wb.status().unwrap().message,
        "Removed 1 duplicate row(s). Original data rows: 3 | Final unique data rows: 2"
    );
}

#[tokio::test]
async fn test_dedup_header_only() {
    let mut wb = workbench();
    let source = csv("data.csv", "h,v\n");
    assert!(wb.dedup(source, &DedupMode::AllColumns).await.is_none());
    assert_eq!(
        wb.status().unwrap().message,
        "File must have at least one header and one data row."
    );
}

#[tokio::test]
async fn test_concatenate_columns() {
    let mut wb = workbench();
    let source = csv("items.csv", "A,B\n1,2\n3,\n");
    let edit = ColumnEdit::Concatenate {
        columns: vec![0, 1],
        separator: "-".to_string(),
        new_column_name: "AB".to_string(),
    };

    let artifact = wb.edit_columns(source, &edit).await.unwrap();
    assert_eq!(artifact.file_name, "items_concatenated_2024-03-09.csv");
    assert_eq!(
        String::from_utf8(artifact.bytes).unwrap(),
        "A,B,AB\n1,2,1-2\n3,,3-\n"
    );
    assert_eq!(wb.sessions().read(|s| s.selected_columns.clone()), vec![0, 1]);
}

#[tokio::test]
async fn test_run_jobs_write_artifacts() {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let out = dir.join("out");
    std::fs::write(dir.join("serials.csv"), "S1\nS2\n").unwrap();

    let mut wb = workbench();

    let job = JobConfig::SerialSheet {
        input: dir.join("serials.csv"),
        config: None,
    };
    let path = wb.run_job(&job, &out).await.unwrap();
    assert_eq!(path, out.join("code128_barcodes_2024-03-09.pdf"));
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));

    let job = JobConfig::PalletSheet { config: None };
    let path = wb.run_job(&job, &out).await.unwrap();
    assert_eq!(path.file_name(), Some("pallet_PLT_barcodes_2024-03-09.pdf"));
    assert_eq!(wb.sessions().read(|s| s.items.len()), 30);

    let metrics = wb.metrics();
    assert_eq!(
        metrics
            .artifacts_written
            .load(std::sync::atomic::Ordering::Relaxed),
        2
    );
}

#[tokio::test]
async fn test_run_job_missing_input() {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

    let mut wb = workbench();
    let job = JobConfig::Dedup {
        input: dir.join("missing.csv"),
        mode: DedupMode::AllColumns,
    };

    assert!(wb.run_job(&job, &dir).await.is_none());
    let status = wb.status().unwrap();
    assert_eq!(status.level, StatusLevel::Danger);
    assert!(status.message.contains("missing.csv"));
}
