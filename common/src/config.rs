use config::Config;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

use crate::{Error, Result};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetadataConfig {
    #[serde(default = "default_metadata_path")]
    pub path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Skip rows with missing fields instead of failing the load.
    #[serde(default)]
    pub skip_malformed: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    #[default]
    Stub,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub kind: ExtractorKind,
    #[serde(default = "default_rows_per_table")]
    pub rows_per_table: usize,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    #[default]
    Console,
    Jsonl,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoaderConfig {
    #[serde(default)]
    pub kind: LoaderKind,
    /// Target directory for file based loaders.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_continue_on_error")]
    pub continue_on_error: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            path: default_metadata_path(),
            delimiter: default_delimiter(),
            skip_malformed: false,
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            kind: ExtractorKind::default(),
            rows_per_table: default_rows_per_table(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            kind: LoaderKind::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            continue_on_error: default_continue_on_error(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_metadata_path() -> PathBuf {
    PathBuf::from("sample_metadata.csv")
}

fn default_delimiter() -> char {
    ','
}

fn default_rows_per_table() -> usize {
    3
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_batch_size() -> usize {
    1000
}

fn default_continue_on_error() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Loads settings from `path` (optional on disk) layered under
    /// `ETL_*` environment variables, e.g. `ETL_METADATA__PATH`.
    pub fn new(path: &str) -> Result<Self> {
        let builder = Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("ETL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        // Build the configuration
        let config = builder.build()?;

        let settings: Settings = config.try_deserialize()?;

        debug!(
            metadata = %settings.metadata.path.display(),
            extractor = ?settings.extractor.kind,
            loader = ?settings.loader.kind,
            batch_size = settings.pipeline.batch_size,
            "Loaded ETL settings"
        );

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.batch_size == 0 {
            return Err(Error::InvalidInput(
                "pipeline.batch_size must be greater than zero".to_string(),
            ));
        }
        if !self.metadata.delimiter.is_ascii() {
            return Err(Error::InvalidInput(format!(
                "metadata.delimiter must be a single ASCII character, got {:?}",
                self.metadata.delimiter
            )));
        }
        Ok(())
    }

    /// Replaces the metadata path, typically from a command line flag.
    pub fn with_metadata_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata.path = path.into();
        self
    }
}
