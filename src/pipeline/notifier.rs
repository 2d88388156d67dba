//! Model change notifications.
//!
//! The `Notifier` fans typed [`ModelEvent`]s out to every subscriber over
//! unbounded crossbeam channels. Sends happen synchronously on the
//! publishing thread, so each subscriber sees events in publication order
//! and nothing is dropped while the subscriber is alive. Subscribers whose
//! receiver has been dropped are pruned on the next publication.

use crate::types::SchemaDocument;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// Events published to subscribers
#[derive(Debug, Clone)]
pub enum ModelEvent {
    /// The active schema was loaded, replaced or cleared.
    ///
    /// `path` is `None` when no schema is active anymore.
    SchemaChanged { path: Option<PathBuf> },

    /// A schema load failed; text for the user-facing message box.
    LoadFailed { title: String, message: String },

    /// A frame produced a populated document.
    ModelReady(Arc<SchemaDocument>),
}

/// Fan-out of [`ModelEvent`]s. Cloning shares the subscriber list.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    subscribers: Arc<Mutex<Vec<Sender<ModelEvent>>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&self) -> Receiver<ModelEvent> {
        let (tx, rx) = unbounded();
        self.lock().push(tx);
        rx
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Send an event to every subscriber
    pub fn broadcast(&self, event: ModelEvent) {
        self.lock().retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn schema_changed(&self, path: Option<PathBuf>) {
        self.broadcast(ModelEvent::SchemaChanged { path });
    }

    pub fn load_failed(&self, title: impl Into<String>, message: impl Into<String>) {
        self.broadcast(ModelEvent::LoadFailed {
            title: title.into(),
            message: message.into(),
        });
    }

    /// Publish a populated document.
    ///
    /// Documents without groups are suppressed; returns whether the
    /// document was published.
    pub fn publish(&self, document: SchemaDocument) -> bool {
        if document.is_empty() {
            tracing::trace!("Suppressing empty document");
            return false;
        }
        self.broadcast(ModelEvent::ModelReady(Arc::new(document)));
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<ModelEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
