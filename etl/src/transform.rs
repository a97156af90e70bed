use crate::models::Row;
use chrono::{DateTime, SecondsFormat, Utc};
use common::Result;
use tracing::debug;

pub const PROCESSED_AT: &str = "processed_at";

/// A transformation over a whole batch of rows.
pub trait Transformer: Send + Sync {
    fn transform(&self, rows: Vec<Row>) -> Result<Vec<Row>>;
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Stamps every row with the time it was processed.
pub struct TimestampTransformer {
    clock: Clock,
}

impl TimestampTransformer {
    pub fn new() -> Self {
        Self {
            clock: Box::new(Utc::now),
        }
    }

    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            clock: Box::new(clock),
        }
    }
}

impl Default for TimestampTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer for TimestampTransformer {
    fn transform(&self, rows: Vec<Row>) -> Result<Vec<Row>> {
        debug!(rows = rows.len(), "Transforming data");
        Ok(rows
            .into_iter()
            .map(|mut row| {
                let now = (self.clock)().to_rfc3339_opts(SecondsFormat::Micros, true);
                row.set(PROCESSED_AT, now);
                row
            })
            .collect())
    }
}
