pub mod connectors;
pub mod extract;
pub mod load;
pub mod logging;
pub mod metadata;
pub mod models;
pub mod pipeline;
pub mod transform;

use std::path::PathBuf;
use std::sync::Arc;

use common::config::Settings;
use common::Result;
use metadata::MetadataOptions;
use models::RunReport;
use pipeline::{Pipeline, PipelineOptions};
use tracing::{info, warn};
use transform::TimestampTransformer;

/// Per-invocation overrides on top of the configuration file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub metadata_path: Option<PathBuf>,
    /// Print the mapping plan without calling any connector.
    pub dry_run: bool,
}

/// Loads the config at `config_path` and applies the per-invocation overrides.
pub fn load_settings(config_path: &str, options: &RunOptions) -> Result<Settings> {
    let mut settings = Settings::new(config_path)?;
    if let Some(path) = options.metadata_path.clone() {
        settings = settings.with_metadata_path(path);
    }
    Ok(settings)
}

/// Runs the complete ETL pipeline described by the config at `config_path`.
/// Logging is left to the caller; see [`logging::init_tracing`].
pub async fn run_etl_pipeline(config_path: &str, options: RunOptions) -> Result<RunReport> {
    let settings = load_settings(config_path, &options)?;
    run_with_settings(&settings, options.dry_run).await
}

pub async fn run_with_settings(settings: &Settings, dry_run: bool) -> Result<RunReport> {
    let mappings = metadata::read_metadata(
        &settings.metadata.path,
        MetadataOptions::from(&settings.metadata),
    )?;

    if mappings.is_empty() {
        warn!(path = %settings.metadata.path.display(), "No table mappings found");
    }

    if dry_run {
        for (key, columns) in pipeline::plan(&mappings) {
            println!("{}: {}", key, columns.join(", "));
        }
        info!(tables = mappings.len(), "Dry run complete");
        return Ok(RunReport::default());
    }

    let pipeline = Pipeline::new(
        connectors::build_extractor(&settings.extractor),
        Arc::new(TimestampTransformer::new()),
        connectors::build_loader(&settings.loader),
        PipelineOptions::from(&settings.pipeline),
    );

    pipeline.run(&mappings).await
}
