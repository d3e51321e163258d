use crate::models::{JobConfig, UserConfig};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Default configuration directory, relative to the working directory.
pub const DEFAULT_CONFIG_DIR: &str = "labelkit Data";

/// Configuration manager for loading and saving YAML configuration files.
///
/// Manages the settings file (`labelkit Settings.yaml`) holding the per-tool
/// defaults, and reads job files describing a single tool run.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    user_config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing configuration files (e.g., "labelkit Data")
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            user_config_path: config_dir.join("labelkit Settings.yaml"),
            config_dir,
        })
    }

    /// Load the user configuration file.
    ///
    /// # Returns
    /// The loaded UserConfig, or default if file doesn't exist
    pub fn load_user_config(&self) -> Result<UserConfig> {
        if !self.user_config_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.user_config_path
            );
            return Ok(UserConfig::default());
        }

        let file_contents = fs::read_to_string(&self.user_config_path)
            .with_context(|| format!("Failed to read settings: {}", self.user_config_path))?;

        let config: UserConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.user_config_path))?;

        tracing::info!("Loaded settings from {}", self.user_config_path);
        Ok(config)
    }

    /// Save the user configuration file.
    pub fn save_user_config(&self, config: &UserConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize settings to YAML")?;

        fs::write(&self.user_config_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.user_config_path))?;

        tracing::info!("Saved settings to {}", self.user_config_path);
        Ok(())
    }

    /// Load a job file.
    ///
    /// Relative input paths in the job are resolved against the job file's directory.
    pub fn load_job(&self, path: &Utf8Path) -> Result<JobConfig> {
        let file_contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read job: {}", path))?;

        let job: JobConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse job: {}", path))?;

        let base = path.parent().unwrap_or(Utf8Path::new(""));
        let job = resolve_inputs(job, base);

        tracing::info!("Loaded {} job from {}", job.kind().name(), path);
        Ok(job)
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn user_config_path(&self) -> &Utf8Path {
        &self.user_config_path
    }
}

fn resolve(base: &Utf8Path, input: Utf8PathBuf) -> Utf8PathBuf {
    if input.is_absolute() || base.as_str().is_empty() {
        input
    } else {
        base.join(input)
    }
}

fn resolve_inputs(job: JobConfig, base: &Utf8Path) -> JobConfig {
    match job {
        JobConfig::SerialSheet { input, config } => JobConfig::SerialSheet {
            input: resolve(base, input),
            config,
        },
        JobConfig::Pdf417Sheet { input, config } => JobConfig::Pdf417Sheet {
            input: resolve(base, input),
            config,
        },
        JobConfig::Split { input, config } => JobConfig::Split {
            input: resolve(base, input),
            config,
        },
        JobConfig::Merge { inputs, config } => JobConfig::Merge {
            inputs: inputs.into_iter().map(|i| resolve(base, i)).collect(),
            config,
        },
        JobConfig::Dedup { input, mode } => JobConfig::Dedup {
            input: resolve(base, input),
            mode,
        },
        JobConfig::EditColumns { input, edit } => JobConfig::EditColumns {
            input: resolve(base, input),
            edit,
        },
        other @ (JobConfig::LocationSheet { .. }
        | JobConfig::PalletSheet { .. }
        | JobConfig::RandomStrings { .. }) => other,
    }
}
