// Run metrics module
//
// Provides lightweight counters for what the tools processed during a run

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters collected across every tool run
///
/// Uses atomic operations so a shared `Arc<Metrics>` can be updated through
/// `&self`. Logged once on shutdown by the job runner.
#[derive(Debug)]
pub struct Metrics {
    /// Rows read from input files
    pub rows_loaded: AtomicUsize,

    /// Barcode symbols rendered successfully
    pub items_rendered: AtomicUsize,

    /// Items whose symbol could not be rendered
    pub render_failures: AtomicUsize,

    /// Duplicate rows dropped by dedup runs
    pub duplicates_removed: AtomicUsize,

    /// Sequential, location and random identifiers generated
    pub ids_generated: AtomicUsize,

    /// Artifacts produced
    pub artifacts_written: AtomicUsize,

    /// Time spent building artifacts, in milliseconds
    pub total_export_time_ms: AtomicU64,

    /// Tool runs that ended with an error status
    pub failed_runs: AtomicUsize,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            rows_loaded: AtomicUsize::new(0),
            items_rendered: AtomicUsize::new(0),
            render_failures: AtomicUsize::new(0),
            duplicates_removed: AtomicUsize::new(0),
            ids_generated: AtomicUsize::new(0),
            artifacts_written: AtomicUsize::new(0),
            total_export_time_ms: AtomicU64::new(0),
            failed_runs: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_rows_loaded(&self, rows: usize) {
        self.rows_loaded.fetch_add(rows, Ordering::Relaxed);
    }

    /// Record the outcome of one render pass
    pub fn record_render(&self, rendered: usize, failures: usize) {
        self.items_rendered.fetch_add(rendered, Ordering::Relaxed);
        self.render_failures.fetch_add(failures, Ordering::Relaxed);
    }

    pub fn record_duplicates(&self, count: usize) {
        self.duplicates_removed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_ids_generated(&self, count: usize) {
        self.ids_generated.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a finished artifact and how long it took to build
    pub fn record_artifact(&self, duration: Duration) {
        self.artifacts_written.fetch_add(1, Ordering::Relaxed);
        self.total_export_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_failed_run(&self) {
        self.failed_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average build time per artifact in milliseconds
    pub fn avg_export_time_ms(&self) -> f64 {
        let total = self.total_export_time_ms.load(Ordering::Relaxed);
        let count = self.artifacts_written.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        let uptime = self.uptime();
        tracing::info!("=== Run Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", uptime.as_secs_f64());
        tracing::info!(
            "Rows loaded: {}, identifiers generated: {}",
            self.rows_loaded.load(Ordering::Relaxed),
            self.ids_generated.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Barcodes: {} rendered, {} failed",
            self.items_rendered.load(Ordering::Relaxed),
            self.render_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Duplicates removed: {}",
            self.duplicates_removed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Artifacts: {} written, {} failed runs (export time {:.2}s, avg {:.2}ms)",
            self.artifacts_written.load(Ordering::Relaxed),
            self.failed_runs.load(Ordering::Relaxed),
            self.total_export_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_export_time_ms()
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
