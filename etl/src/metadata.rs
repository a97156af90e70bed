use crate::models::{MappingEntry, MappingGroup};
use common::config::MetadataConfig;
use common::{Error, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

pub const SOURCE_TABLE: &str = "source_table";
pub const TARGET_TABLE: &str = "target_table";
pub const COLUMN_NAME: &str = "column_name";

#[derive(Debug, Clone, Copy)]
pub struct MetadataOptions {
    pub delimiter: u8,
    pub skip_malformed: bool,
}

impl Default for MetadataOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            skip_malformed: false,
        }
    }
}

impl From<&MetadataConfig> for MetadataOptions {
    fn from(config: &MetadataConfig) -> Self {
        Self {
            // Settings::validate guarantees an ASCII delimiter
            delimiter: config.delimiter as u8,
            skip_malformed: config.skip_malformed,
        }
    }
}

/// Reads the mapping file at `path` and groups it by (source, target) pair.
pub fn read_metadata(path: &Path, options: MetadataOptions) -> Result<MappingGroup> {
    let file = File::open(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("cannot open metadata file {}: {}", path.display(), e),
        ))
    })?;

    let group = parse_metadata(file, options)?;
    info!(
        path = %path.display(),
        tables = group.len(),
        entries = group.entry_count(),
        "Loaded table mappings"
    );
    Ok(group)
}

pub fn parse_metadata<R: Read>(reader: R, options: MetadataOptions) -> Result<MappingGroup> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let layout = HeaderLayout::from_headers(&headers)?;

    let mut group = MappingGroup::new();
    for record in reader.byte_records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let parsed = StringRecord::from_byte_record(record)
            .map_err(|e| Error::MetadataMalformed {
                line,
                reason: format!("invalid UTF-8: {}", e.utf8_error()),
            })
            .and_then(|record| layout.entry(&record, line));

        match parsed {
            Ok(entry) => group.insert(entry),
            Err(err) if options.skip_malformed => {
                warn!(error = %err, "Skipping malformed metadata row");
            }
            Err(err) => return Err(err),
        }
    }

    for key in group.keys() {
        for column in group.duplicate_columns(key) {
            warn!(table = %key, column, "Column mapped more than once");
        }
    }

    debug!(tables = group.len(), "Parsed metadata");
    Ok(group)
}

struct HeaderLayout {
    source_table: usize,
    target_table: usize,
    column_name: usize,
}

impl HeaderLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let position = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                Error::MetadataHeader(format!(
                    "missing required column '{}' (found: {})",
                    name,
                    headers.iter().collect::<Vec<_>>().join(", ")
                ))
            })
        };

        Ok(Self {
            source_table: position(SOURCE_TABLE)?,
            target_table: position(TARGET_TABLE)?,
            column_name: position(COLUMN_NAME)?,
        })
    }

    fn entry(&self, record: &StringRecord, line: u64) -> Result<MappingEntry> {
        let field = |index: usize, name: &str| match record.get(index) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::MetadataMalformed {
                line,
                reason: format!("missing value for '{}'", name),
            }),
        };

        Ok(MappingEntry::new(
            field(self.source_table, SOURCE_TABLE)?,
            field(self.target_table, TARGET_TABLE)?,
            field(self.column_name, COLUMN_NAME)?,
        ))
    }
}
