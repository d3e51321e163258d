//! labelkit - tabular data tools for labels and spreadsheets
//!
//! Main entry point for the job runner.
//!
//! # Overview
//!
//! Each job file describes one tool run (a barcode sheet, identifier batch,
//! split, merge, dedup or column edit). The runner initializes:
//! - Configuration loading ([`ConfigManager`]) from `labelkit Data/`
//! - Logging infrastructure (file rotation + console output)
//! - A current-thread tokio runtime; tools yield cooperatively between batches
//! - The [`Workbench`], which owns the session and runs every job in order
//!
//! # Execution Flow
//!
//! 1. Parse arguments
//! 2. Load `labelkit Settings.yaml` (defaults when missing)
//! 3. Initialize logging → logs/labelkit.<date>
//! 4. For every job file: load it, run it, write the artifact to the output directory
//! 5. Log the metrics summary; exit non-zero if any job failed
//!
//! # Example
//!
//! ```text
//! labelkit --output-dir out jobs/pallets.yaml jobs/dedup.yaml
//! ```

use anyhow::{Result, bail};
use camino::Utf8PathBuf;
use clap::Parser;
use labelkit::config::DEFAULT_CONFIG_DIR;
use labelkit::{APP_NAME, ConfigManager, VERSION, Workbench};

#[derive(Parser)]
#[command(name = "labelkit", version, about = "Run labelkit job files")]
struct Args {
    /// Job files to run, in order.
    #[arg(required = true, value_name = "JOB")]
    jobs: Vec<Utf8PathBuf>,

    /// Directory holding `labelkit Settings.yaml`.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_CONFIG_DIR)]
    config_dir: Utf8PathBuf,

    /// Where artifacts are written. Overrides the settings file.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<Utf8PathBuf>,

    /// Directory for rotating log files.
    #[arg(long, value_name = "DIR", default_value = "logs")]
    log_dir: String,

    /// Log at debug level.
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_manager = ConfigManager::new(&args.config_dir)?;
    let user_config = config_manager.load_user_config()?;
    let settings = user_config.settings;

    let _guard = labelkit::logging::setup_logging_with_console(
        &args.log_dir,
        args.debug || settings.debug_mode,
        true,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!("Settings: {}", config_manager.user_config_path());

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| Utf8PathBuf::from(&settings.output_dir));

    // Handlers only yield cooperatively, so one thread is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut workbench = Workbench::new(settings);
    let metrics = workbench.metrics();

    let failed = runtime.block_on(async {
        let mut failed = 0usize;

        for job_path in &args.jobs {
            let job = match config_manager.load_job(job_path) {
                Ok(job) => job,
                Err(e) => {
                    tracing::error!("{:#}", e);
                    failed += 1;
                    continue;
                }
            };

            match workbench.run_job(&job, &output_dir).await {
                Some(path) => tracing::info!("{} -> {}", job_path, path),
                None => {
                    // The reason was already logged when the status was posted
                    failed += 1;
                }
            }
        }

        failed
    });

    metrics.log_summary();
    tracing::info!("Shutdown complete");

    if failed > 0 {
        bail!("{} of {} jobs failed", failed, args.jobs.len());
    }
    Ok(())
}
