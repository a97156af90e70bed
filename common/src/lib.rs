use thiserror::Error;

pub mod config;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Metadata header error: {0}")]
    MetadataHeader(String),

    #[error("Malformed metadata at line {line}: {reason}")]
    MetadataMalformed { line: u64, reason: String },

    #[error("Extract from {table} failed: {reason}")]
    ExtractFailed { table: String, reason: String },

    #[error("Transform failed: {0}")]
    TransformFailed(String),

    #[error("Load into {table} failed: {reason}")]
    LoadFailed { table: String, reason: String },

    #[error("Pipeline failed for {failed} of {total} table mappings")]
    PipelineFailed { failed: usize, total: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Errors that must stop the whole run even when sibling tables are
    /// isolated from each other. A transform failure is a logic bug, so
    /// it would fail the same way for every table.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self, Error::TransformFailed(_) | Error::Config(_))
    }

    pub fn extract_failed(table: &str, reason: impl ToString) -> Self {
        Error::ExtractFailed {
            table: table.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn load_failed(table: &str, reason: impl ToString) -> Self {
        Error::LoadFailed {
            table: table.to_string(),
            reason: reason.to_string(),
        }
    }
}
