//! Core data types for framemap-rs
//!
//! This module contains the schema data model shared by the schema store,
//! the frame mapper and every downstream consumer.
//!
//! # Main Types
//!
//! - [`SchemaDocument`] - An ordered list of groups, loaded from a JSON map file
//! - [`Group`] - A titled list of datasets
//! - [`Dataset`] - One named value with a 1-based field index into the frame
//! - [`OperationMode`] - Whether frames carry their own structure or need a map
//!
//! # Round-tripping
//!
//! Scalar keys are never converted on load. Documents and groups keep them
//! in `extra`, datasets keep their whole object, and typed accessors read
//! from there. A loaded schema serializes back to the JSON it was read from;
//! mapping only adds or replaces each dataset's `value`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How incoming frames are turned into a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OperationMode {
    /// Frames are delimited value lists; structure comes from the loaded schema
    #[default]
    Manual,
    /// Frames are complete JSON documents
    Automatic,
}

impl std::fmt::Display for OperationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationMode::Manual => write!(f, "Manual"),
            OperationMode::Automatic => write!(f, "Automatic"),
        }
    }
}

/// A schema document: groups of datasets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Groups in display order
    #[serde(default)]
    pub groups: Vec<Group>,

    /// Every other top-level key, including the project `title`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchemaDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from an already parsed JSON value.
    ///
    /// The root must be a JSON object.
    pub fn from_value(value: Value) -> crate::Result<Self> {
        if !value.is_object() {
            return Err(crate::FrameMapError::Parse {
                message: "document root must be a JSON object".to_string(),
                line: 0,
                column: 0,
            });
        }
        serde_json::from_value(value).map_err(|e| crate::FrameMapError::from_json(&e))
    }

    /// Parse a document from raw JSON bytes
    pub fn from_slice(bytes: &[u8]) -> crate::Result<Self> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| crate::FrameMapError::from_json(&e))?;
        Self::from_value(value)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.extra.insert("title".into(), Value::String(title.into()));
        self
    }

    /// Add a group
    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    /// Project title, if the document has a string one
    pub fn title(&self) -> Option<&str> {
        self.extra.get("title").and_then(Value::as_str)
    }

    /// A document with no groups is never published
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over every dataset in document order
    pub fn datasets(&self) -> impl Iterator<Item = &Dataset> {
        self.groups.iter().flat_map(|g| g.datasets.iter())
    }

    /// Total number of datasets across all groups
    pub fn dataset_count(&self) -> usize {
        self.groups.iter().map(|g| g.datasets.len()).sum()
    }

    /// Find a group by title
    pub fn find_group(&self, title: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.title() == title)
    }

    /// Serialize to compact JSON
    pub fn to_json(&self) -> String {
        // Maps with string keys and JSON values always serialize
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// A titled collection of datasets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub datasets: Vec<Dataset>,

    /// Every other key, including `title` and `widget`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Group {
    pub fn new(title: impl Into<String>) -> Self {
        let mut group = Self::default();
        group.extra.insert("title".into(), Value::String(title.into()));
        group
    }

    pub fn with_widget(mut self, widget: impl Into<String>) -> Self {
        self.extra.insert("widget".into(), Value::String(widget.into()));
        self
    }

    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.datasets.push(dataset);
        self
    }

    /// Group title, empty when missing or not a string
    pub fn title(&self) -> &str {
        string_key(&self.extra, "title").unwrap_or_default()
    }

    /// Widget hint for the whole group (e.g. "multiplot", "gps")
    pub fn widget(&self) -> Option<&str> {
        string_key(&self.extra, "widget")
    }

    pub fn find_dataset(&self, title: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.title() == title)
    }
}

/// One named value inside a group.
///
/// The dataset is kept as the JSON object the schema author wrote; the
/// accessors interpret it without rewriting anything, so a loaded schema
/// serializes back exactly as it was read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    pub properties: Map<String, Value>,
}

impl Dataset {
    pub fn new(index: i64, title: impl Into<String>) -> Self {
        let mut properties = Map::new();
        properties.insert("index".into(), Value::from(index));
        properties.insert("title".into(), Value::String(title.into()));
        Self { properties }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.properties
            .insert("units".into(), Value::String(units.into()));
        self
    }

    pub fn with_widget(mut self, widget: impl Into<String>) -> Self {
        self.properties
            .insert("widget".into(), Value::String(widget.into()));
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.set_value(value);
        self
    }

    /// The `index` exactly as written in the schema
    pub fn index(&self) -> Option<&Value> {
        self.properties.get("index")
    }

    /// 1-based field position; 0 (never populated) unless `index` is an
    /// integral number within `i32` range
    pub fn field_index(&self) -> i64 {
        self.index().map_or(0, index_from_value)
    }

    /// Dataset title, empty when missing or not a string
    pub fn title(&self) -> &str {
        string_key(&self.properties, "title").unwrap_or_default()
    }

    pub fn units(&self) -> Option<&str> {
        string_key(&self.properties, "units")
    }

    pub fn widget(&self) -> Option<&str> {
        string_key(&self.properties, "widget")
    }

    /// Value for the current frame (unset in a freshly loaded schema)
    pub fn value(&self) -> Option<&Value> {
        self.properties.get("value")
    }

    pub fn set_value(&mut self, value: Value) {
        self.properties.insert("value".into(), value);
    }

    /// The populated value as text, if it is a string
    pub fn value_str(&self) -> Option<&str> {
        self.value().and_then(Value::as_str)
    }

    /// The populated value as a number, for plots and gauges
    pub fn numeric_value(&self) -> Option<f64> {
        match self.value()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Lower bound for gauges and bars
    pub fn min(&self) -> Option<f64> {
        self.properties.get("min").and_then(number_like)
    }

    /// Upper bound for gauges and bars
    pub fn max(&self) -> Option<f64> {
        self.properties.get("max").and_then(number_like)
    }

    /// Whether the dataset should be plotted over time
    pub fn graph(&self) -> bool {
        self.flag("graph")
    }

    /// Whether the dataset drives an LED indicator
    pub fn led(&self) -> bool {
        self.flag("led")
    }

    /// Whether the dataset gets an FFT plot
    pub fn fft(&self) -> bool {
        self.flag("fft")
    }

    fn flag(&self, key: &str) -> bool {
        self.properties
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

fn string_key<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn index_from_value(value: &Value) -> i64 {
    let Value::Number(n) = value else {
        return 0;
    };
    n.as_i64()
        .or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= f64::from(i32::MAX))
                .map(|f| f as i64)
        })
        .filter(|i| i32::try_from(*i).is_ok())
        .unwrap_or(0)
}
