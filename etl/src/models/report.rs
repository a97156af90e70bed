use super::TableKey;
use serde::Serialize;
use std::time::Duration;

/// Outcome of running one (source, target) mapping.
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub key: TableKey,
    pub columns: usize,
    pub rows_extracted: usize,
    pub rows_loaded: usize,
    pub batches: usize,
    pub duration_ms: u128,
    pub error: Option<String>,
}

impl TableReport {
    pub fn new(key: TableKey, columns: usize) -> Self {
        Self {
            key,
            columns,
            rows_extracted: 0,
            rows_loaded: 0,
            batches: 0,
            duration_ms: 0,
            error: None,
        }
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.duration_ms = elapsed.as_millis();
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub tables: Vec<TableReport>,
}

impl RunReport {
    pub fn push(&mut self, table: TableReport) {
        self.tables.push(table);
    }

    pub fn tables_succeeded(&self) -> usize {
        self.tables.iter().filter(|t| t.is_success()).count()
    }

    pub fn tables_failed(&self) -> usize {
        self.tables.len() - self.tables_succeeded()
    }

    pub fn rows_loaded(&self) -> usize {
        self.tables.iter().map(|t| t.rows_loaded).sum()
    }

    pub fn is_success(&self) -> bool {
        self.tables_failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &TableReport> {
        self.tables.iter().filter(|t| !t.is_success())
    }

    pub fn to_json(&self) -> common::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
