//! Schema store.
//!
//! Holds the active schema document (the "JSON map") that manual-mode frames
//! are mapped against. Loading reads and validates a file, strips the
//! reserved [`FRAME_PARSER_KEY`] entry and swaps the new document in as one
//! `Arc`; readers keep whatever snapshot they captured. A failed load never
//! leaves a stale document behind: the store is cleared, the remembered path
//! is forgotten and the failure is published for the UI.
//!
//! Loads are serialized internally. They perform blocking file I/O and are
//! meant to run on the thread handling the user's request, never on the
//! frame path.

use crate::config::AppStateFile;
use crate::error::{FrameMapError, Result};
use crate::pipeline::notifier::Notifier;
use crate::types::SchemaDocument;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Reserved top-level key holding the frame parser script
pub const FRAME_PARSER_KEY: &str = "frameParser";

#[derive(Debug, Default)]
struct ActiveSchema {
    document: Arc<SchemaDocument>,
    path: Option<PathBuf>,
    parser_source: Option<String>,
}

/// Owner of the canonical schema document
#[derive(Debug)]
pub struct SchemaStore {
    active: RwLock<ActiveSchema>,
    write_lock: Mutex<()>,
    state: AppStateFile,
    notifier: Notifier,
}

impl SchemaStore {
    /// Create an empty store persisting to `state`
    pub fn new(state: AppStateFile, notifier: Notifier) -> Self {
        Self {
            active: RwLock::new(ActiveSchema::default()),
            write_lock: Mutex::new(()),
            state,
            notifier,
        }
    }

    /// Create an empty store that persists nothing
    pub fn in_memory() -> Self {
        Self::new(AppStateFile::disabled(), Notifier::new())
    }

    /// The notifier this store publishes on
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Load the schema at `path` and make it the active document
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<SchemaDocument>> {
        let path = path.as_ref();
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        match read_schema(path) {
            Ok((document, parser_source)) => {
                let document = Arc::new(document);
                tracing::info!(
                    "Loaded schema {:?}: {} groups, {} datasets",
                    path,
                    document.groups.len(),
                    document.dataset_count()
                );
                self.swap(ActiveSchema {
                    document: document.clone(),
                    path: Some(path.to_path_buf()),
                    parser_source,
                });
                // Stored absolute; restore runs from an unknown working directory
                let remembered = std::fs::canonicalize(path).unwrap_or_else(|e| {
                    tracing::debug!("Keeping {:?} as given: {}", path, e);
                    path.to_path_buf()
                });
                self.state.remember_schema(Some(&remembered));
                self.notifier.schema_changed(Some(path.to_path_buf()));
                Ok(document)
            }
            Err(e) => {
                tracing::warn!("Failed to load schema {:?}: {}", path, e);
                self.swap(ActiveSchema::default());
                self.state.remember_schema(None);
                self.notifier.load_failed(e.user_title(), e.user_message());
                self.notifier.schema_changed(None);
                Err(e)
            }
        }
    }

    /// Reload the schema remembered from the previous session.
    ///
    /// Returns `None` when nothing was remembered. A failed reload behaves
    /// exactly like a failed [`load`](Self::load).
    pub fn restore(&self) -> Option<Result<Arc<SchemaDocument>>> {
        let path = self.state.last_schema()?;
        tracing::info!("Restoring schema from {:?}", path);
        Some(self.load(path))
    }

    /// Unload the active schema and forget its location
    pub fn clear(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.swap(ActiveSchema::default());
        self.state.remember_schema(None);
        tracing::info!("Schema cleared");
        self.notifier.schema_changed(None);
    }

    /// Snapshot of the active document (empty if none is loaded)
    pub fn current(&self) -> Arc<SchemaDocument> {
        self.read().document.clone()
    }

    /// Whether a schema is loaded
    pub fn is_loaded(&self) -> bool {
        self.read().path.is_some()
    }

    /// Path of the loaded schema file
    pub fn file_path(&self) -> Option<PathBuf> {
        self.read().path.clone()
    }

    /// File name of the loaded schema (e.g. "JsonMap.json"), empty if none
    pub fn file_name(&self) -> String {
        self.read()
            .path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Source of the frame parser script stripped from the loaded schema
    pub fn frame_parser_source(&self) -> Option<String> {
        self.read().parser_source.clone()
    }

    fn swap(&self, next: ActiveSchema) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ActiveSchema> {
        self.active.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read and validate a schema file, splitting off the parser script
fn read_schema(path: &Path) -> Result<(SchemaDocument, Option<String>)> {
    let data = std::fs::read(path).map_err(|source| FrameMapError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut value: Value =
        serde_json::from_slice(&data).map_err(|e| FrameMapError::from_json(&e))?;
    let parser = value
        .as_object_mut()
        .and_then(|root| root.remove(FRAME_PARSER_KEY));

    let document = SchemaDocument::from_value(value)?;
    Ok((document, parser.and_then(parser_source)))
}

/// The reserved key holds either the script itself or `{"code": "..."}`
fn parser_source(value: Value) -> Option<String> {
    let code = match value {
        Value::String(code) => code,
        Value::Object(mut obj) => match obj.remove("code") {
            Some(Value::String(code)) => code,
            _ => return None,
        },
        _ => return None,
    };
    (!code.trim().is_empty()).then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::notifier::ModelEvent;
    use serde_json::json;
    use std::io::Write;

    fn write_schema(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const SENSORS: &str = r#"{
        "title": "Weather",
        "frameParser": "fn parse(frame, separator) { frame.split(separator) }",
        "groups": [{"title": "Sensors", "datasets": [{"index": 1, "title": "Temp"}]}]
    }"#;

    #[test]
    fn test_empty_store() {
        let store = SchemaStore::in_memory();
        assert!(store.current().is_empty());
        assert!(!store.is_loaded());
        assert_eq!(store.file_name(), "");
    }

    #[test]
    fn test_load_strips_frame_parser() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_schema(&dir, "map.json", SENSORS);
        let store = SchemaStore::in_memory();

        let doc = store.load(&path).unwrap();
        assert!(!doc.extra.contains_key(FRAME_PARSER_KEY));
        assert!(!store.current().to_json().contains(FRAME_PARSER_KEY));
        assert_eq!(doc.groups[0].datasets[0].title(), "Temp");
        assert_eq!(store.file_name(), "map.json");
        assert_eq!(store.file_path(), Some(path));
        assert!(store
            .frame_parser_source()
            .unwrap()
            .contains("fn parse"));
    }

    #[test]
    fn test_parser_source_object_form() {
        assert_eq!(
            parser_source(json!({"code": "fn parse(a, b) { [] }"})),
            Some("fn parse(a, b) { [] }".to_string())
        );
        assert_eq!(parser_source(json!("   ")), None);
        assert_eq!(parser_source(json!(12)), None);
    }

    #[test]
    fn test_load_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_schema(&dir, "map.json", SENSORS);
        let store = SchemaStore::in_memory();
        let rx = store.notifier().subscribe();

        store.load(&path).unwrap();
        match rx.try_recv().unwrap() {
            ModelEvent::SchemaChanged { path: Some(p) } => assert_eq!(p, path),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_clears_store() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_schema(&dir, "good.json", SENSORS);
        let bad = write_schema(&dir, "bad.json", r#"{"groups": [}"#);
        let store = SchemaStore::in_memory();
        store.load(&good).unwrap();
        let rx = store.notifier().subscribe();

        let err = store.load(&bad).unwrap_err();
        assert!(matches!(err, FrameMapError::Parse { .. }));
        assert!(store.current().is_empty());
        assert!(store.frame_parser_source().is_none());

        let events: Vec<_> = rx.try_iter().collect();
        assert!(matches!(
            &events[0],
            ModelEvent::LoadFailed { title, .. } if title == "JSON parse error"
        ));
        assert!(matches!(&events[1], ModelEvent::SchemaChanged { path: None }));
    }

    #[test]
    fn test_wrong_shape_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_schema(&dir, "shape.json", r#"{"groups": {"title": "x"}}"#);
        let store = SchemaStore::in_memory();
        assert!(matches!(
            store.load(&path).unwrap_err(),
            FrameMapError::Parse { .. }
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SchemaStore::in_memory();
        let err = store.load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, FrameMapError::Io { .. }));
        assert_eq!(err.user_title(), "Cannot read JSON file");
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_schema(&dir, "a.json", SENSORS);
        let second = write_schema(
            &dir,
            "b.json",
            r#"{"groups": [{"title": "Power", "datasets": []}]}"#,
        );
        let store = SchemaStore::in_memory();
        store.load(&first).unwrap();

        let snapshot = store.current();
        store.load(&second).unwrap();

        assert_eq!(snapshot.groups[0].title(), "Sensors");
        assert_eq!(store.current().groups[0].title(), "Power");
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_schema(&dir, "map.json", SENSORS);
        let store = SchemaStore::in_memory();
        store.load(&path).unwrap();
        let rx = store.notifier().subscribe();

        store.clear();
        assert!(store.current().is_empty());
        assert!(!store.is_loaded());
        assert!(matches!(
            rx.try_recv().unwrap(),
            ModelEvent::SchemaChanged { path: None }
        ));
    }

    #[test]
    fn test_loaded_document_is_unchanged() {
        let source = json!({
            "title": "Lenient",
            "groups": [{
                "title": null,
                "datasets": [
                    {"index": "4", "title": "T"},
                    {"index": 2.5, "units": 0},
                    {"index": null, "title": null}
                ]
            }]
        });
        let dir = tempfile::tempdir().unwrap();
        let path = write_schema(&dir, "lenient.json", &source.to_string());
        let store = SchemaStore::in_memory();

        store.load(&path).unwrap();
        assert_eq!(serde_json::to_value(&*store.current()).unwrap(), source);
        assert!(store.current().datasets().all(|d| d.field_index() == 0));
    }

    #[test]
    fn test_remembered_path_is_absolute() {
        let dir = tempfile::tempdir_in(".").unwrap();
        let path = write_schema(&dir, "map.json", SENSORS);
        assert!(path.is_relative());

        let state = AppStateFile::at(dir.path().join("app_state.json"));
        let store = SchemaStore::new(state.clone(), Notifier::new());
        store.load(&path).unwrap();

        let remembered = state.last_schema().unwrap();
        assert!(remembered.is_absolute());
        assert_eq!(remembered, std::fs::canonicalize(&path).unwrap());
        assert_eq!(store.file_path(), Some(path));
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_schema(&dir, "map.json", SENSORS);
        let store = SchemaStore::in_memory();

        let a = store.load(&path).unwrap();
        let b = store.load(&path).unwrap();
        assert_eq!(a, b);
    }
}
