//! # framemap-rs: Frame Decoding and Field Mapping
//!
//! Turns a stream of device frames into a structured data model (groups of
//! datasets with titles, units and values) that dashboards, plots and
//! exporters can render without knowing the wire format.
//!
//! ## Architecture
//!
//! - **Decoder**: Renders frame bytes as UTF-8, hex or base64 text
//! - **Splitter**: Cuts frame text into fields; pluggable through `FrameParser`
//! - **Scripting**: Rhai-based frame parsers shipped inside schema files
//! - **Schema**: The loaded JSON map, swapped atomically on reload
//! - **Pipeline**: Maps each frame against the schema and publishes the result
//!   over crossbeam channels
//!
//! ## Operation Modes
//!
//! - **Manual**: frames are delimited values such as `23.5,60`; a JSON map
//!   assigns each 1-based field position to a dataset
//! - **Automatic**: frames are complete JSON documents and are published as-is
//!
//! ## Example
//!
//! ```ignore
//! use framemap_rs::{
//!     config::{AppStateFile, PipelineConfig},
//!     pipeline::{FramePipeline, ModelEvent, Notifier},
//!     schema::SchemaStore,
//! };
//! use std::sync::Arc;
//!
//! let store = Arc::new(SchemaStore::new(AppStateFile::default_location(), Notifier::new()));
//! store.load("maps/weather.json")?;
//!
//! let pipeline = FramePipeline::new(store, PipelineConfig::default());
//! let events = pipeline.subscribe();
//!
//! pipeline.frame_received(b"23.5,60");
//! if let Ok(ModelEvent::ModelReady(doc)) = events.try_recv() {
//!     println!("{}", doc.to_json());
//! }
//! ```

pub mod config;
pub mod decoder;
pub mod error;
pub mod pipeline;
pub mod schema;
pub mod scripting;
pub mod splitter;
pub mod types;

// Re-export commonly used types
pub use config::{AppState, AppStateFile, PipelineConfig};
pub use decoder::{decode_frame, DecodedText, DecoderMethod};
pub use error::{FrameMapError, Result};
pub use pipeline::{FramePipeline, ModelEvent, Notifier, PipelineBridge};
pub use schema::SchemaStore;
pub use scripting::ScriptFrameParser;
pub use splitter::{split_fields, FrameParser, SeparatorSplitter};
pub use types::{Dataset, Group, OperationMode, SchemaDocument};
