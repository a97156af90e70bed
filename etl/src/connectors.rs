use crate::extract::{Extractor, StubExtractor};
use crate::load::{ConsoleLoader, JsonLinesLoader, Loader};
use common::config::{ExtractorConfig, ExtractorKind, LoaderConfig, LoaderKind};
use std::sync::Arc;

pub fn build_extractor(config: &ExtractorConfig) -> Arc<dyn Extractor> {
    match config.kind {
        ExtractorKind::Stub => Arc::new(StubExtractor::new(config.rows_per_table)),
    }
}

pub fn build_loader(config: &LoaderConfig) -> Arc<dyn Loader> {
    match config.kind {
        LoaderKind::Console => Arc::new(ConsoleLoader::new()),
        LoaderKind::Jsonl => Arc::new(JsonLinesLoader::new(config.output_dir.clone())),
    }
}
