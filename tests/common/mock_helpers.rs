//! Store and pipeline construction helpers

use framemap_rs::config::{AppStateFile, PipelineConfig};
use framemap_rs::pipeline::{FramePipeline, Notifier};
use framemap_rs::SchemaStore;
use std::path::PathBuf;
use std::sync::Arc;

/// App state file inside `dir`
pub fn state_file(dir: &tempfile::TempDir) -> AppStateFile {
    AppStateFile::at(state_path(dir))
}

pub fn state_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("app_state.json")
}

/// A store persisting to `dir`, as a fresh process would create it
pub fn create_test_store(dir: &tempfile::TempDir) -> Arc<SchemaStore> {
    Arc::new(SchemaStore::new(state_file(dir), Notifier::new()))
}

/// A pipeline over an in-memory store
pub fn create_test_pipeline(config: PipelineConfig) -> FramePipeline {
    FramePipeline::new(Arc::new(SchemaStore::in_memory()), config)
}
