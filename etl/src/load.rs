use crate::models::Row;
use async_trait::async_trait;
use common::{Error, Result};
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Target side of a table mapping. Returns how many rows were accepted.
#[async_trait]
pub trait Loader: Send + Sync {
    fn name(&self) -> &str;

    async fn load(&self, table: &str, rows: &[Row]) -> Result<usize>;
}

/// Prints rows to stdout instead of persisting them.
#[derive(Debug, Default)]
pub struct ConsoleLoader;

impl ConsoleLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn render(table: &str, rows: &[Row]) -> Vec<String> {
        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(format!("Loading data into {}...", table));
        lines.extend(rows.iter().map(Row::to_string));
        lines
    }
}

#[async_trait]
impl Loader for ConsoleLoader {
    fn name(&self) -> &str {
        "console"
    }

    async fn load(&self, table: &str, rows: &[Row]) -> Result<usize> {
        for line in Self::render(table, rows) {
            println!("{}", line);
        }
        Ok(rows.len())
    }
}

/// Appends rows as JSON lines to `<output_dir>/<table>.jsonl`.
#[derive(Debug, Clone)]
pub struct JsonLinesLoader {
    output_dir: PathBuf,
}

impl JsonLinesLoader {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn table_path(&self, table: &str) -> Result<PathBuf> {
        if table.is_empty() || table.contains(['/', '\\']) || table == "." || table == ".." {
            return Err(Error::load_failed(table, "table name is not a valid file name"));
        }
        Ok(self.output_dir.join(format!("{}.jsonl", table)))
    }
}

#[async_trait]
impl Loader for JsonLinesLoader {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn load(&self, table: &str, rows: &[Row]) -> Result<usize> {
        let path = self.table_path(table)?;

        // serialize the whole batch before touching the file
        let mut buffer = String::new();
        for row in rows {
            buffer.push_str(&row.to_json_line()?);
            buffer.push('\n');
        }

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| Error::load_failed(table, e))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| Error::load_failed(table, e))?;

        file.write_all(buffer.as_bytes())
            .await
            .map_err(|e| Error::load_failed(table, e))?;
        file.flush().await.map_err(|e| Error::load_failed(table, e))?;

        debug!(table, path = %path.display(), rows = rows.len(), "Appended rows");
        info!(table, rows = rows.len(), "Loaded batch");
        Ok(rows.len())
    }
}
