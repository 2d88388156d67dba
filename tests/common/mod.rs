//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use crossbeam_channel::Receiver;
use framemap_rs::pipeline::ModelEvent;
use framemap_rs::SchemaDocument;
use std::sync::Arc;
use std::time::Duration;

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_millis(500)
}

/// Collect every published document currently queued on `rx`
pub fn ready_models(rx: &Receiver<ModelEvent>) -> Vec<Arc<SchemaDocument>> {
    rx.try_iter()
        .filter_map(|event| match event {
            ModelEvent::ModelReady(doc) => Some(doc),
            _ => None,
        })
        .collect()
}

/// Wait for the next published document, skipping schema events
pub fn next_model(rx: &Receiver<ModelEvent>) -> Option<Arc<SchemaDocument>> {
    loop {
        match rx.recv_timeout(test_timeout()).ok()? {
            ModelEvent::ModelReady(doc) => return Some(doc),
            _ => continue,
        }
    }
}

/// Value of the first dataset titled `title`, as text
pub fn dataset_value(doc: &SchemaDocument, title: &str) -> Option<String> {
    doc.datasets()
        .find(|d| d.title() == title)
        .and_then(|d| d.value_str())
        .map(str::to_string)
}
