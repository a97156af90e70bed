use crate::extract::Extractor;
use crate::load::Loader;
use crate::models::{MappingGroup, RunReport, TableKey, TableReport};
use crate::transform::Transformer;
use common::Result;
use common::config::PipelineConfig;
use futures::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub batch_size: usize,
    /// Record a failed table and move on instead of aborting the run.
    pub continue_on_error: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for PipelineOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            continue_on_error: config.continue_on_error,
        }
    }
}

/// Runs extract, transform and load for each table mapping, one table at a
/// time and one batch at a time.
pub struct Pipeline {
    extractor: Arc<dyn Extractor>,
    transformer: Arc<dyn Transformer>,
    loader: Arc<dyn Loader>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        transformer: Arc<dyn Transformer>,
        loader: Arc<dyn Loader>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            extractor,
            transformer,
            loader,
            options,
        }
    }

    pub async fn run(&self, mappings: &MappingGroup) -> Result<RunReport> {
        info!(
            tables = mappings.len(),
            extractor = self.extractor.name(),
            loader = self.loader.name(),
            batch_size = self.options.batch_size,
            "Starting ETL run"
        );

        let mut report = RunReport::default();
        for key in mappings.keys() {
            let columns = mappings.columns(key);
            // a column mapped twice is still one field per row
            let distinct = columns.iter().collect::<HashSet<_>>().len();
            let mut table = TableReport::new(key.clone(), distinct);
            let started = Instant::now();

            let span = info_span!("table", source = %key.source_table, target = %key.target_table);
            let result = self
                .run_table(key, &columns, &mut table)
                .instrument(span)
                .await;
            table.finish(started.elapsed());

            match result {
                Ok(()) => {
                    info!(
                        table = %key,
                        rows = table.rows_loaded,
                        batches = table.batches,
                        duration_ms = table.duration_ms as u64,
                        "Table mapping complete"
                    );
                    report.push(table);
                }
                Err(e) => {
                    error!(table = %key, error = %e, "Table mapping failed");
                    table.error = Some(e.to_string());
                    report.push(table);
                    if e.is_fatal_for_run() || !self.options.continue_on_error {
                        return Err(e);
                    }
                }
            }
        }

        info!(
            succeeded = report.tables_succeeded(),
            failed = report.tables_failed(),
            rows = report.rows_loaded(),
            "ETL run finished"
        );
        Ok(report)
    }

    async fn run_table(
        &self,
        key: &TableKey,
        columns: &[&str],
        table: &mut TableReport,
    ) -> Result<()> {
        let mut batches =
            self.extractor
                .extract_batches(&key.source_table, columns, self.options.batch_size);

        while let Some(batch) = batches.next().await {
            let batch = batch?;
            table.rows_extracted += batch.len();

            let batch = self.transformer.transform(batch)?;
            table.rows_loaded += self.loader.load(&key.target_table, &batch).await?;
            table.batches += 1;
        }
        Ok(())
    }
}

/// Column list per table mapping, in run order, without touching any connector.
pub fn plan(mappings: &MappingGroup) -> Vec<(TableKey, Vec<String>)> {
    mappings
        .iter()
        .map(|(key, entries)| {
            let columns = entries.iter().map(|e| e.column_name.clone()).collect();
            (key.clone(), columns)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::StubExtractor;
    use crate::models::{MappingEntry, Row};
    use crate::transform::TimestampTransformer;
    use async_trait::async_trait;
    use common::Error;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLoader {
        calls: Mutex<Vec<(String, Vec<Row>)>>,
    }

    #[async_trait]
    impl Loader for RecordingLoader {
        fn name(&self) -> &str {
            "recording"
        }

        async fn load(&self, table: &str, rows: &[Row]) -> Result<usize> {
            self.calls
                .lock()
                .unwrap()
                .push((table.to_string(), rows.to_vec()));
            Ok(rows.len())
        }
    }

    struct FailingTransformer;

    impl Transformer for FailingTransformer {
        fn transform(&self, _rows: Vec<Row>) -> Result<Vec<Row>> {
            Err(Error::TransformFailed("boom".into()))
        }
    }

    fn orders() -> MappingGroup {
        vec![
            MappingEntry::new("orders", "orders_dw", "id"),
            MappingEntry::new("orders", "orders_dw", "amount"),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_batches_flow_through_all_stages() {
        let loader = Arc::new(RecordingLoader::default());
        let pipeline = Pipeline::new(
            Arc::new(StubExtractor::new(5)),
            Arc::new(TimestampTransformer::default()),
            loader.clone(),
            PipelineOptions {
                batch_size: 2,
                continue_on_error: true,
            },
        );

        let report = pipeline.run(&orders()).await.unwrap();

        let calls = loader.calls.lock().unwrap();
        let sizes: Vec<usize> = calls.iter().map(|(_, rows)| rows.len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert!(calls.iter().all(|(table, _)| table == "orders_dw"));

        let table = &report.tables[0];
        assert_eq!(table.rows_extracted, 5);
        assert_eq!(table.rows_loaded, 5);
        assert_eq!(table.batches, 3);
        assert_eq!(table.columns, 2);
    }

    #[tokio::test]
    async fn test_report_counts_distinct_columns() {
        let mut mappings = orders();
        mappings.insert(MappingEntry::new("orders", "orders_dw", "id"));

        let pipeline = Pipeline::new(
            Arc::new(StubExtractor::default()),
            Arc::new(TimestampTransformer::default()),
            Arc::new(RecordingLoader::default()),
            PipelineOptions::default(),
        );

        let report = pipeline.run(&mappings).await.unwrap();
        assert_eq!(mappings.columns(&TableKey::new("orders", "orders_dw")).len(), 3);
        assert_eq!(report.tables[0].columns, 2);
    }

    #[tokio::test]
    async fn test_transform_failure_aborts_run() {
        let loader = Arc::new(RecordingLoader::default());
        let mut mappings = orders();
        mappings.insert(MappingEntry::new("users", "users_dw", "id"));

        let pipeline = Pipeline::new(
            Arc::new(StubExtractor::default()),
            Arc::new(FailingTransformer),
            loader.clone(),
            PipelineOptions::default(),
        );

        let err = pipeline.run(&mappings).await.unwrap_err();
        assert!(matches!(err, Error::TransformFailed(_)));
        assert!(loader.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_plan_lists_columns() {
        let plan = plan(&orders());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].0, TableKey::new("orders", "orders_dw"));
        assert_eq!(plan[0].1, vec!["id", "amount"]);
    }
}
