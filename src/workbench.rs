// Workbench - runs tool pipelines against the session
//
// Every public handler is one user action: it activates its tool, loads the
// source into the session, runs the pipeline and either records the artifact
// or turns the error into a status message. No handler error escapes as a
// `Result`; callers read the outcome from the returned artifact and the session.

use std::sync::Arc;
use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use tokio::sync::broadcast;

use crate::error::{ToolError, ToolResult};
use crate::metrics::Metrics;
use crate::models::config::{MAX_GENERATED_CODES, MAX_LOCATION_PREFIX_LEN};
use crate::models::{
    ColumnEdit, DedupMode, FileKind, JobConfig, LayoutGeometry, LoadedSource, LocationSheetConfig,
    MergeConfig, PalletSheetConfig, Pdf417SheetConfig, RandomStringsConfig, Row,
    SerialSheetConfig, SplitConfig, StatusMessage, TabularFormat, ToolKind, ToolSettings,
};
use crate::services::barcode::{self, Preview, RenderRequest, SymbolRenderer, Symbology};
use crate::services::document::{self, CaptionStyle, CaptionText};
use crate::services::export::{self, Artifact, ArtifactNamer, CsvQuoting};
use crate::services::identifiers::{self, RotationSchedule};
use crate::services::{dedup, grouping, loader, tabular, Paginator, RxingRenderer};
use crate::state::{SessionChange, SessionManager};

/// Rows shown by [`Workbench::table_preview`].
pub const TABLE_PREVIEW_ROWS: usize = 50;

/// Bar height, in modules, of rendered linear symbols.
const BAR_HEIGHT_MODULES: u32 = 40;

const NO_VALID_DATA: &str = "No valid data found in the file. Please check your file format.";

/// A finished run: the artifact and the status to post.
struct ToolOutput {
    artifact: Artifact,
    status: StatusMessage,
}

/// Everything needed to turn the session items into one PDF sheet.
struct SheetJob<'a> {
    title: &'a str,
    geometry: LayoutGeometry,
    symbology: Symbology,
    scale: u32,
    caption: CaptionText,
    style: CaptionStyle,
}

/// Runs tool pipelines against a [`SessionManager`]
///
/// Owns the session, the tool defaults from settings, the symbol renderer and
/// the artifact namer. Handlers take `&mut self`, so only one runs at a time.
///
/// # Example
/// ```ignore
/// let mut workbench = Workbench::new(settings);
/// let source = labelkit::services::load_file(Utf8Path::new("serials.csv")).await?;
/// if let Some(artifact) = workbench.serial_sheet(source, &config).await {
///     artifact.write_to(Utf8Path::new("output")).await?;
/// }
/// ```
pub struct Workbench {
    sessions: SessionManager,
    settings: ToolSettings,
    renderer: Box<dyn SymbolRenderer>,
    namer: ArtifactNamer,
    metrics: Arc<Metrics>,
}

impl Workbench {
    /// Workbench with the `rxing` renderer and today's date for artifact names
    pub fn new(settings: ToolSettings) -> Self {
        Self::with_renderer(settings, Box::new(RxingRenderer::new()))
    }

    pub fn with_renderer(settings: ToolSettings, renderer: Box<dyn SymbolRenderer>) -> Self {
        Self {
            sessions: SessionManager::new(),
            settings,
            renderer,
            namer: ArtifactNamer::today(),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Use a fixed namer (and so a fixed date) for artifact names
    pub fn with_namer(mut self, namer: ArtifactNamer) -> Self {
        self.namer = namer;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.sessions.subscribe()
    }

    /// Last posted status message
    pub fn status(&self) -> Option<StatusMessage> {
        self.sessions.read(|s| s.status.clone())
    }

    /// Drop the source and everything derived from it
    pub fn clear(&mut self) -> Vec<SessionChange> {
        let mut changes = self.sessions.clear();
        changes.extend(
            self.sessions
                .post_status(StatusMessage::info("All data cleared.")),
        );
        changes
    }

    /// Render the first `limit` session items for preview
    pub fn preview(&self, symbology: Symbology, scale: u32, limit: usize) -> Preview {
        let request = RenderRequest {
            symbology,
            scale,
            height: BAR_HEIGHT_MODULES,
        };
        self.sessions
            .read(|s| barcode::preview(self.renderer.as_ref(), request, &s.items, limit))
    }

    /// First rows of the loaded source
    pub fn table_preview(&self) -> Vec<Row> {
        self.sessions.read(|s| {
            s.source
                .as_ref()
                .map(|source| {
                    source
                        .table
                        .rows
                        .iter()
                        .take(TABLE_PREVIEW_ROWS)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    // Tool handlers

    /// CODE128 sheet of the first-column values, each captioned with its value
    pub async fn serial_sheet(
        &mut self,
        source: LoadedSource,
        config: &SerialSheetConfig,
    ) -> Option<Artifact> {
        let started = self.begin(ToolKind::SerialSheet, Some(&source));
        let result = self.build_serial_sheet(&source, config).await;
        self.finish(ToolKind::SerialSheet, started, result)
    }

    /// PDF417 sheet of grouped first-column values
    pub async fn pdf417_sheet(
        &mut self,
        source: LoadedSource,
        config: &Pdf417SheetConfig,
    ) -> Option<Artifact> {
        let started = self.begin(ToolKind::Pdf417Sheet, Some(&source));
        let result = self.build_pdf417_sheet(&source, config).await;
        self.finish(ToolKind::Pdf417Sheet, started, result)
    }

    /// CODE128 sheet of `PREFIX001..` location codes
    pub async fn location_sheet(&mut self, config: &LocationSheetConfig) -> Option<Artifact> {
        let started = self.begin(ToolKind::LocationSheet, None);
        let result = self.build_location_sheet(config).await;
        self.finish(ToolKind::LocationSheet, started, result)
    }

    /// CODE128 sheet of zero-padded pallet codes
    pub async fn pallet_sheet(&mut self, config: &PalletSheetConfig) -> Option<Artifact> {
        let started = self.begin(ToolKind::PalletSheet, None);
        let result = self.build_pallet_sheet(config).await;
        self.finish(ToolKind::PalletSheet, started, result)
    }

    /// Table of random serials with rotating box ids
    pub async fn random_strings(&mut self, config: &RandomStringsConfig) -> Option<Artifact> {
        let started = self.begin(ToolKind::RandomStrings, None);
        let result = self.build_random_strings(config).await;
        self.finish(ToolKind::RandomStrings, started, result)
    }

    /// ZIP of the source split into files of `rows_per_file` data rows
    pub async fn split(&mut self, source: LoadedSource, config: &SplitConfig) -> Option<Artifact> {
        let started = self.begin(ToolKind::Split, Some(&source));
        let result = self.build_split(&source, config).await;
        self.finish(ToolKind::Split, started, result)
    }

    /// One workbook holding the rows of every source
    pub async fn merge(
        &mut self,
        sources: Vec<LoadedSource>,
        config: &MergeConfig,
    ) -> Option<Artifact> {
        let started = self.begin(ToolKind::Merge, None);
        for source in &sources {
            self.metrics.record_rows_loaded(source.table.len());
        }
        let result = self.build_merge(&sources, config);
        self.finish(ToolKind::Merge, started, result)
    }

    /// The source without duplicate data rows
    pub async fn dedup(&mut self, source: LoadedSource, mode: &DedupMode) -> Option<Artifact> {
        let started = self.begin(ToolKind::Dedup, Some(&source));
        let result = self.build_dedup(&source, mode);
        self.finish(ToolKind::Dedup, started, result)
    }

    /// The source with columns modified or a concatenated column appended
    pub async fn edit_columns(
        &mut self,
        source: LoadedSource,
        edit: &ColumnEdit,
    ) -> Option<Artifact> {
        let started = self.begin(ToolKind::EditColumns, Some(&source));
        let result = self.build_column_edit(&source, edit);
        self.finish(ToolKind::EditColumns, started, result)
    }

    /// Run one job: load its inputs, run the tool and write the artifact into `output_dir`
    ///
    /// Tool settings fill in any config the job leaves out. Returns the written
    /// path, or `None` when the run failed (the reason is the session status).
    pub async fn run_job(&mut self, job: &JobConfig, output_dir: &Utf8Path) -> Option<Utf8PathBuf> {
        let tool = job.kind();
        tracing::info!("Running {} job", tool.name());

        let artifact = match job {
            JobConfig::SerialSheet { input, config } => {
                let source = self.open(tool, input).await?;
                let config = config
                    .clone()
                    .unwrap_or_else(|| self.settings.serial_sheet.clone());
                self.serial_sheet(source, &config).await
            }
            JobConfig::Pdf417Sheet { input, config } => {
                let source = self.open(tool, input).await?;
                let config = config
                    .clone()
                    .unwrap_or_else(|| self.settings.pdf417_sheet.clone());
                self.pdf417_sheet(source, &config).await
            }
            JobConfig::LocationSheet { config } => {
                let config = config
                    .clone()
                    .unwrap_or_else(|| self.settings.location_sheet.clone());
                self.location_sheet(&config).await
            }
            JobConfig::PalletSheet { config } => {
                let config = config
                    .clone()
                    .unwrap_or_else(|| self.settings.pallet_sheet.clone());
                self.pallet_sheet(&config).await
            }
            JobConfig::RandomStrings { config } => {
                let config = config
                    .clone()
                    .unwrap_or_else(|| self.settings.random_strings.clone());
                self.random_strings(&config).await
            }
            JobConfig::Split { input, config } => {
                let source = self.open(tool, input).await?;
                let config = config.clone().unwrap_or_else(|| self.settings.split.clone());
                self.split(source, &config).await
            }
            JobConfig::Merge { inputs, config } => {
                let mut sources = Vec::with_capacity(inputs.len());
                for input in inputs {
                    sources.push(self.open(tool, input).await?);
                }
                self.merge(sources, config).await
            }
            JobConfig::Dedup { input, mode } => {
                let source = self.open(tool, input).await?;
                self.dedup(source, mode).await
            }
            JobConfig::EditColumns { input, edit } => {
                let source = self.open(tool, input).await?;
                self.edit_columns(source, edit).await
            }
        }?;

        match artifact.write_to(output_dir).await {
            Ok(path) => Some(path),
            Err(e) => {
                self.fail(tool, e);
                None
            }
        }
    }

    // Pipeline plumbing

    fn begin(&mut self, tool: ToolKind, source: Option<&LoadedSource>) -> Instant {
        self.sessions.activate(tool);
        if let Some(source) = source {
            self.metrics.record_rows_loaded(source.table.len());
            self.sessions.load_source(source.clone());
        }
        tracing::debug!("Started {}", tool.name());
        Instant::now()
    }

    fn finish(
        &mut self,
        tool: ToolKind,
        started: Instant,
        result: ToolResult<ToolOutput>,
    ) -> Option<Artifact> {
        match result {
            Ok(output) => {
                self.metrics.record_artifact(started.elapsed());
                self.sessions.record_artifact(
                    output.artifact.file_name.clone(),
                    output.artifact.bytes.len(),
                );
                self.sessions.post_status(output.status);
                tracing::debug!("Finished {} in {:?}", tool.name(), started.elapsed());
                Some(output.artifact)
            }
            Err(e) => {
                self.fail(tool, e);
                None
            }
        }
    }

    fn fail(&mut self, tool: ToolKind, error: ToolError) {
        self.metrics.record_failed_run();
        tracing::debug!("{} failed: {:?}", tool.name(), error);
        self.sessions
            .post_status(StatusMessage::new(error.status_level(), error.to_string()));
    }

    async fn open(&mut self, tool: ToolKind, path: &Utf8Path) -> Option<LoadedSource> {
        self.sessions.activate(tool);
        match loader::load_file(path).await {
            Ok(source) => Some(source),
            Err(e) => {
                self.fail(tool, e);
                None
            }
        }
    }

    /// Replace the session items and log the preview truncation note
    fn set_items(&mut self, items: Vec<String>, limit: usize) {
        let total = items.iter().filter(|item| !item.is_empty()).count();
        self.sessions.set_items(items);
        if let Some(note) = barcode::preview_note(total.min(limit), total) {
            tracing::info!("{}", note);
        }
    }

    async fn render_sheet(&mut self, job: SheetJob<'_>) -> ToolResult<(Vec<u8>, usize)> {
        let paginator = Paginator::new(job.geometry)?;
        let request = RenderRequest {
            symbology: job.symbology,
            scale: job.scale,
            height: BAR_HEIGHT_MODULES,
        };

        let items = self.sessions.read(|s| s.items.clone());
        let report = barcode::render_items(
            self.renderer.as_ref(),
            request,
            &items,
            self.settings.render_batch_size,
        )
        .await;
        self.metrics.record_render(report.rendered(), report.failures);

        let failures = report.failures;
        let placements = document::place_items(&paginator, report.items, &job.caption);
        let bytes = document::write_sheet(job.title, &job.geometry, &placements, job.style)?;
        Ok((bytes, failures))
    }

    // Tool pipelines

    async fn build_serial_sheet(
        &mut self,
        source: &LoadedSource,
        config: &SerialSheetConfig,
    ) -> ToolResult<ToolOutput> {
        let items: Vec<String> = source
            .table
            .first_column()
            .into_iter()
            .filter(|value| !value.trim().is_empty())
            .collect();
        if items.is_empty() {
            return Err(ToolError::EmptyDataset(NO_VALID_DATA.to_string()));
        }

        self.set_items(items, config.preview_count);

        let file_name = self.namer.serial_sheet();
        let (bytes, failures) = self
            .render_sheet(SheetJob {
                title: &file_name,
                geometry: config.geometry,
                symbology: Symbology::Code128,
                scale: config.scale,
                caption: CaptionText::ItemText,
                style: CaptionStyle::compact(f64::from(config.geometry.text_allowance)),
            })
            .await?;

        Ok(sheet_output(file_name, bytes, failures))
    }

    async fn build_pdf417_sheet(
        &mut self,
        source: &LoadedSource,
        config: &Pdf417SheetConfig,
    ) -> ToolResult<ToolOutput> {
        let base = grouping::substitute_template(
            &config.base_template,
            &config.part_number,
            &config.qty_info,
        );
        let items = grouping::group_values(&source.table.first_column(), config.group_size, &base)?;
        if items.is_empty() {
            return Err(ToolError::EmptyDataset(NO_VALID_DATA.to_string()));
        }

        let groups = items.iter().filter(|item| !item.is_empty()).count();
        tracing::info!(
            "Successfully processed data. Generated {} barcode groups.",
            groups
        );
        self.set_items(items, config.preview_count);

        let file_name = self.namer.pdf417_sheet(&config.caption);
        let (bytes, failures) = self
            .render_sheet(SheetJob {
                title: &file_name,
                geometry: config.geometry,
                symbology: Symbology::Pdf417,
                scale: config.scale,
                caption: CaptionText::Fixed(config.caption.clone()),
                style: CaptionStyle::compact(f64::from(config.geometry.text_allowance)),
            })
            .await?;

        Ok(sheet_output(file_name, bytes, failures))
    }

    async fn build_location_sheet(
        &mut self,
        config: &LocationSheetConfig,
    ) -> ToolResult<ToolOutput> {
        let prefix = config.prefix.trim();
        if config.count == 0 {
            return Err(ToolError::invalid_config(
                "Please enter a valid number of barcodes.",
            ));
        }
        if prefix.is_empty() {
            return Err(ToolError::invalid_config("Please enter a barcode prefix."));
        }
        if config.count > MAX_GENERATED_CODES {
            return Err(ToolError::invalid_config(format!(
                "Maximum {} barcodes allowed at once.",
                MAX_GENERATED_CODES
            )));
        }
        if prefix.chars().count() > MAX_LOCATION_PREFIX_LEN {
            return Err(ToolError::invalid_config(format!(
                "Maximum {} characters allowed for prefix",
                MAX_LOCATION_PREFIX_LEN
            )));
        }

        let items = identifiers::location_codes(prefix, config.count);
        self.metrics.record_ids_generated(items.len());
        self.set_items(items, config.preview_count);
        tracing::info!(
            "Generated {} location barcodes with prefix \"{}\"",
            config.count,
            prefix
        );

        let file_name = self.namer.location_sheet(prefix);
        let (bytes, failures) = self
            .render_sheet(SheetJob {
                title: &file_name,
                geometry: config.geometry,
                symbology: Symbology::Code128,
                scale: config.scale,
                caption: CaptionText::ItemText,
                style: CaptionStyle::large(15.0),
            })
            .await?;

        Ok(sheet_output(file_name, bytes, failures))
    }

    async fn build_pallet_sheet(&mut self, config: &PalletSheetConfig) -> ToolResult<ToolOutput> {
        let prefix = config.prefix.trim();
        if config.count == 0 {
            return Err(ToolError::invalid_config(
                "Please enter a valid number of barcodes.",
            ));
        }
        if config.count > MAX_GENERATED_CODES {
            return Err(ToolError::invalid_config(format!(
                "Maximum {} barcodes allowed at once.",
                MAX_GENERATED_CODES
            )));
        }
        if prefix.is_empty() {
            return Err(ToolError::invalid_config("Please enter a barcode prefix."));
        }

        let items = identifiers::sequential_ids(
            prefix,
            config.starting_number,
            config.count,
            config.total_length,
        )?;
        self.metrics.record_ids_generated(items.len());
        self.set_items(items, config.preview_count);
        tracing::info!("Generated {} pallet barcodes", config.count);

        let file_name = self.namer.pallet_sheet(prefix);
        let (bytes, failures) = self
            .render_sheet(SheetJob {
                title: &file_name,
                geometry: config.geometry,
                symbology: Symbology::Code128,
                scale: config.scale,
                caption: CaptionText::ItemText,
                style: CaptionStyle::large(18.0),
            })
            .await?;

        Ok(sheet_output(file_name, bytes, failures))
    }

    async fn build_random_strings(
        &mut self,
        config: &RandomStringsConfig,
    ) -> ToolResult<ToolOutput> {
        let schedule = RotationSchedule::new(config.box_id_interval)?;
        let started = Instant::now();
        let batch = identifiers::generate_serial_batch(
            config.count,
            schedule,
            config.box_id_prefix.trim(),
            config.box_id_digits,
        )
        .await?;
        let elapsed = started.elapsed();

        self.metrics.record_ids_generated(batch.records.len());
        tracing::info!(
            "Generated {} serials across {} box ids",
            batch.records.len(),
            batch.unique_box_ids
        );

        self.sessions.set_items(
            batch
                .records
                .iter()
                .map(|record| record.serial_with_s.clone())
                .collect(),
        );

        let mut rows: Vec<Row> = Vec::with_capacity(batch.records.len() + 1);
        rows.push(vec![
            "Serial Number (With S)".to_string(),
            "Serial Number (Without S)".to_string(),
            "Box ID".to_string(),
        ]);
        rows.extend(batch.records.into_iter().map(|record| record.into_row()));

        for row in rows.iter().skip(1).take(config.preview_count) {
            tracing::debug!("{}", row.join(" | "));
        }

        let bytes = match config.format {
            TabularFormat::Csv => export::write_csv(&rows, CsvQuoting::Always)?,
            TabularFormat::Xlsx => export::write_xlsx(&rows, "Generated Strings")?,
        };

        Ok(ToolOutput {
            artifact: Artifact::new(self.namer.random_strings(config.format), bytes),
            status: StatusMessage::success(format!(
                "Successfully generated {} serials in {:.2}s",
                config.count,
                elapsed.as_secs_f64()
            )),
        })
    }

    async fn build_split(
        &mut self,
        source: &LoadedSource,
        config: &SplitConfig,
    ) -> ToolResult<ToolOutput> {
        let table = source.table.without_blank_rows();
        let parts = tabular::split_rows(&table, config.rows_per_file, config.header)?;

        let format = output_format(source.kind);
        let stem = source.stem();
        let mut entries = Vec::with_capacity(parts.len());
        for (index, rows) in parts.iter().enumerate() {
            let bytes = export::write_tabular(rows, format, "Sheet1")?;
            entries.push(Artifact::new(
                self.namer.split_part(stem, index + 1, format),
                bytes,
            ));
            tokio::task::yield_now().await;
        }

        let bytes = export::write_zip(&entries)?;
        Ok(ToolOutput {
            artifact: Artifact::new(self.namer.split_archive(stem), bytes),
            status: StatusMessage::success(format!(
                "Successfully created {} files and packed them into a ZIP.",
                entries.len()
            )),
        })
    }

    fn build_merge(
        &mut self,
        sources: &[LoadedSource],
        config: &MergeConfig,
    ) -> ToolResult<ToolOutput> {
        let merged = tabular::merge_tables(sources, config.header)?;
        let bytes = export::write_xlsx(&merged.rows, "Merged_Data")?;

        Ok(ToolOutput {
            artifact: Artifact::new(self.namer.merged(), bytes),
            status: StatusMessage::success(format!(
                "Successfully merged {} files into a single Excel file. Total rows in new file: {}",
                sources.len(),
                merged.len()
            )),
        })
    }

    fn build_dedup(&mut self, source: &LoadedSource, mode: &DedupMode) -> ToolResult<ToolOutput> {
        if let DedupMode::SpecificColumns { columns } = mode {
            self.sessions.select_columns(columns.clone());
        }

        let table = source.table.without_blank_rows();
        if table.len() < 2 {
            return Err(ToolError::EmptyDataset(
                "File must have at least one header and one data row.".to_string(),
            ));
        }

        let outcome = dedup::remove_duplicates(&table, mode)?;
        self.metrics.record_duplicates(outcome.duplicate_count);

        let format = output_format(source.kind);
        let bytes = export::write_tabular(&outcome.table.rows, format, "Unique Data")?;

        Ok(ToolOutput {
            artifact: Artifact::new(self.namer.unique_data(format), bytes),
            status: StatusMessage::success(outcome.summary()),
        })
    }

    fn build_column_edit(
        &mut self,
        source: &LoadedSource,
        edit: &ColumnEdit,
    ) -> ToolResult<ToolOutput> {
        let (table, operation) = match edit {
            ColumnEdit::Modify { affixes } => {
                self.sessions
                    .select_columns(affixes.iter().map(|affix| affix.column).collect());
                (tabular::modify_columns(&source.table, affixes)?, "modified")
            }
            ColumnEdit::Concatenate {
                columns,
                separator,
                new_column_name,
            } => {
                self.sessions.select_columns(columns.clone());
                (
                    tabular::concatenate_columns(
                        &source.table,
                        columns,
                        separator,
                        new_column_name.trim(),
                    )?,
                    "concatenated",
                )
            }
        };

        let format = output_format(source.kind);
        let bytes = export::write_tabular(&table.rows, format, "Sheet1")?;
        let file_name = self.namer.column_edit(source.stem(), operation, format);

        Ok(ToolOutput {
            status: StatusMessage::success(format!(
                "File \"{}\" has been created successfully!",
                file_name
            )),
            artifact: Artifact::new(file_name, bytes),
        })
    }
}

/// CSV sources produce CSV output, Excel sources produce XLSX.
fn output_format(kind: FileKind) -> TabularFormat {
    if kind.is_excel() {
        TabularFormat::Xlsx
    } else {
        TabularFormat::Csv
    }
}

fn sheet_output(file_name: String, bytes: Vec<u8>, failures: usize) -> ToolOutput {
    let status = if failures == 0 {
        StatusMessage::success(format!("PDF generated successfully: {}", file_name))
    } else {
        StatusMessage::warning(format!(
            "PDF generated successfully: {}. {} barcode(s) could not be rendered and were left blank.",
            file_name, failures
        ))
    };

    ToolOutput {
        artifact: Artifact::new(file_name, bytes),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatusLevel;
    use crate::services::BarcodeRaster;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SolidRenderer;

    impl SymbolRenderer for SolidRenderer {
        fn render(
            &self,
            _symbology: Symbology,
            text: &str,
            _scale: u32,
            _height: u32,
        ) -> ToolResult<BarcodeRaster> {
            if text.contains('!') {
                return Err(ToolError::Render {
                    text: text.to_string(),
                    reason: "unsupported character".to_string(),
                });
            }
            BarcodeRaster::new(2, 1, vec![true, false])
        }
    }

    fn workbench() -> Workbench {
        Workbench::with_renderer(ToolSettings::default(), Box::new(SolidRenderer))
            .with_namer(ArtifactNamer::new(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()))
    }

    fn csv_source(name: &str, text: &str) -> LoadedSource {
        loader::load_bytes(name, text.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn test_serial_sheet_produces_pdf() {
        let mut wb = workbench();
        let source = csv_source("serials.csv", "S1\n\nS2\n");
        let artifact = wb
            .serial_sheet(source, &SerialSheetConfig::default())
            .await
            .unwrap();

        assert_eq!(artifact.file_name, "code128_barcodes_2024-03-09.pdf");
        assert!(artifact.bytes.starts_with(b"%PDF"));
        assert_eq!(wb.sessions().read(|s| s.items.clone()), vec!["S1", "S2"]);
        assert_eq!(wb.status().unwrap().level, StatusLevel::Success);
    }

    #[tokio::test]
    async fn test_render_failure_is_reported_not_fatal() {
        let mut wb = workbench();
        let source = csv_source("serials.csv", "S1\nBAD!\nS3\n");
        let artifact = wb.serial_sheet(source, &SerialSheetConfig::default()).await;

        assert!(artifact.is_some());
        let status = wb.status().unwrap();
        assert_eq!(status.level, StatusLevel::Warning);
        assert!(status.message.contains("1 barcode(s)"));
    }

    #[tokio::test]
    async fn test_empty_source_posts_warning() {
        let mut wb = workbench();
        let source = csv_source("blank.csv", "\n ,x\n");
        assert!(
            wb.serial_sheet(source, &SerialSheetConfig::default())
                .await
                .is_none()
        );
        assert_eq!(
            wb.status(),
            Some(StatusMessage::warning(NO_VALID_DATA))
        );
    }

    #[tokio::test]
    async fn test_location_validation() {
        let mut wb = workbench();
        let config = LocationSheetConfig {
            prefix: "ABCDEFGHIJK".to_string(),
            ..Default::default()
        };
        assert!(wb.location_sheet(&config).await.is_none());
        assert_eq!(
            wb.status().unwrap().message,
            "Maximum 10 characters allowed for prefix"
        );

        let config = LocationSheetConfig {
            count: 1001,
            ..Default::default()
        };
        assert!(wb.location_sheet(&config).await.is_none());
        assert_eq!(
            wb.status().unwrap().message,
            "Maximum 1000 barcodes allowed at once."
        );
    }

    struct CountingRenderer(Arc<AtomicUsize>);

    impl SymbolRenderer for CountingRenderer {
        fn render(
            &self,
            _symbology: Symbology,
            _text: &str,
            _scale: u32,
            _height: u32,
        ) -> ToolResult<BarcodeRaster> {
            self.0.fetch_add(1, Ordering::Relaxed);
            BarcodeRaster::new(2, 1, vec![true, false])
        }
    }

    #[tokio::test]
    async fn test_sheet_renders_each_item_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut wb = Workbench::with_renderer(
            ToolSettings::default(),
            Box::new(CountingRenderer(Arc::clone(&calls))),
        );
        let source = csv_source("serials.csv", "S1\nS2\nS3\n");
        wb.serial_sheet(source, &SerialSheetConfig::default())
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_failed_location_run_posts_no_success() {
        let mut wb = workbench();
        let mut rx = wb.subscribe();
        let mut config = LocationSheetConfig {
            count: 3,
            ..Default::default()
        };
        config.geometry.columns = 0;

        assert!(wb.location_sheet(&config).await.is_none());

        let mut statuses = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SessionChange::StatusPosted(status) = event {
                statuses.push(status.level);
            }
        }
        assert_eq!(statuses, vec![StatusLevel::Warning]);
    }

    #[tokio::test]
    async fn test_pallet_run_posts_one_status() {
        let mut wb = workbench();
        let mut rx = wb.subscribe();
        let config = PalletSheetConfig {
            count: 4,
            ..Default::default()
        };

        assert!(wb.pallet_sheet(&config).await.is_some());

        let statuses: Vec<StatusMessage> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter_map(|event| match event {
                SessionChange::StatusPosted(status) => Some(status),
                _ => None,
            })
            .collect();
        assert_eq!(statuses.len(), 1);
        assert!(statuses[0].message.starts_with("PDF generated successfully: pallet_PLT"));
    }

    #[test]
    fn test_random_strings_counts_ids() {
        let mut wb = workbench();
        let config = RandomStringsConfig {
            count: 25,
            format: TabularFormat::Csv,
            ..Default::default()
        };
        let artifact = tokio_test::block_on(wb.random_strings(&config)).unwrap();

        let text = String::from_utf8(artifact.bytes).unwrap();
        assert_eq!(text.lines().count(), 26);
        assert_eq!(wb.metrics().ids_generated.load(Ordering::Relaxed), 25);
    }

    #[test]
    fn test_output_format_follows_source() {
        assert_eq!(output_format(FileKind::Csv), TabularFormat::Csv);
        assert_eq!(output_format(FileKind::Xls), TabularFormat::Xlsx);
    }

    #[tokio::test]
    async fn test_clear_posts_info() {
        let mut wb = workbench();
        wb.dedup(csv_source("d.csv", "h\n1\n1\n"), &DedupMode::AllColumns)
            .await
            .unwrap();
        let changes = wb.clear();
        assert_eq!(changes[0], SessionChange::SessionCleared);
        assert!(wb.table_preview().is_empty());
        assert_eq!(wb.status().unwrap().level, StatusLevel::Info);
    }
}
