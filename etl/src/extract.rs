use crate::models::Row;
use async_trait::async_trait;
use common::Result;
use futures::stream::{self, BoxStream, StreamExt};
use tracing::info;

/// Source side of a table mapping: table name and column list in, rows out.
#[async_trait]
pub trait Extractor: Send + Sync {
    fn name(&self) -> &str;

    async fn extract(&self, table: &str, columns: &[&str]) -> Result<Vec<Row>>;

    /// Rows for `table` as a sequence of batches of at most `batch_size`.
    /// The default fetches everything through [`Extractor::extract`] and
    /// splits it; backends that can page should override this.
    fn extract_batches<'a>(
        &'a self,
        table: &'a str,
        columns: &'a [&'a str],
        batch_size: usize,
    ) -> BoxStream<'a, Result<Vec<Row>>> {
        stream::once(self.extract(table, columns))
            .flat_map(move |result| match result {
                Ok(rows) => stream::iter(chunk_rows(rows, batch_size).into_iter().map(Ok)).boxed(),
                Err(e) => stream::iter(vec![Err(e)]).boxed(),
            })
            .boxed()
    }
}

pub fn chunk_rows(rows: Vec<Row>, batch_size: usize) -> Vec<Vec<Row>> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::new();
    let mut rows = rows.into_iter();
    loop {
        let batch: Vec<Row> = rows.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        batches.push(batch);
    }
    batches
}

/// Produces synthetic rows in place of a source warehouse query.
pub struct StubExtractor {
    rows_per_table: usize,
}

impl StubExtractor {
    pub fn new(rows_per_table: usize) -> Self {
        Self { rows_per_table }
    }

    fn sample_row(columns: &[&str]) -> Row {
        let mut row = Row::new();
        for column in columns {
            row.set(column, format!("sample_{}_value", column));
        }
        row
    }
}

impl Default for StubExtractor {
    fn default() -> Self {
        Self::new(3)
    }
}

#[async_trait]
impl Extractor for StubExtractor {
    fn name(&self) -> &str {
        "stub"
    }

    async fn extract(&self, table: &str, columns: &[&str]) -> Result<Vec<Row>> {
        info!(table, ?columns, "Extracting data");
        Ok((0..self.rows_per_table)
            .map(|_| Self::sample_row(columns))
            .collect())
    }

    fn extract_batches<'a>(
        &'a self,
        table: &'a str,
        columns: &'a [&'a str],
        batch_size: usize,
    ) -> BoxStream<'a, Result<Vec<Row>>> {
        info!(table, ?columns, batch_size, "Extracting data");
        let total = self.rows_per_table;
        let batch_size = batch_size.max(1);

        // rows are generated batch by batch, never all at once
        stream::iter((0..total).step_by(batch_size))
            .map(move |start| {
                let end = (start + batch_size).min(total);
                let batch: Vec<Row> = (start..end).map(|_| Self::sample_row(columns)).collect();
                Ok::<_, common::Error>(batch)
            })
            .boxed()
    }
}
