//! The frame pipeline: configuration, mapper and notifier for one stream.
//!
//! `FramePipeline` is the explicit context object for a stream. It holds
//! the frame settings, the field extractor and a shared handle to the
//! schema store. The transport calls [`FramePipeline::frame_received`] once
//! per frame, serially. Each call captures the current schema snapshot and
//! settings, maps the frame and publishes the result; per-frame failures are
//! logged at debug level and counted, never surfaced.

use crate::config::PipelineConfig;
use crate::decoder::DecoderMethod;
use crate::pipeline::bridge::PipelineCommand;
use crate::pipeline::mapper::{Frame, FrameMapper};
use crate::pipeline::notifier::{ModelEvent, Notifier};
use crate::schema::SchemaStore;
use crate::splitter::FrameParser;
use crate::types::{OperationMode, SchemaDocument};
use crate::Result;
use crossbeam_channel::Receiver;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Non-empty frames handed to the pipeline
    pub frames_received: u64,
    /// Documents published to subscribers
    pub models_published: u64,
    /// Frames dropped by a frame-local error
    pub frames_dropped: u64,
    /// Frames that mapped to a document without groups
    pub empty_suppressed: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    frames_received: AtomicU64,
    models_published: AtomicU64,
    frames_dropped: AtomicU64,
    empty_suppressed: AtomicU64,
}

impl StatsCounters {
    fn snapshot(&self) -> PipelineStats {
        PipelineStats {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            models_published: self.models_published.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            empty_suppressed: self.empty_suppressed.load(Ordering::Relaxed),
        }
    }
}

/// Per-stream processing context
#[derive(Debug)]
pub struct FramePipeline {
    schema: Arc<SchemaStore>,
    config: RwLock<PipelineConfig>,
    mapper: RwLock<FrameMapper>,
    notifier: Notifier,
    stats: StatsCounters,
}

impl FramePipeline {
    /// Create a pipeline over `schema` that publishes on the store's notifier
    pub fn new(schema: Arc<SchemaStore>, config: PipelineConfig) -> Self {
        let notifier = schema.notifier().clone();
        Self {
            schema,
            config: RwLock::new(config),
            mapper: RwLock::new(FrameMapper::new()),
            notifier,
            stats: StatsCounters::default(),
        }
    }

    /// Register a subscriber for schema and model events
    pub fn subscribe(&self) -> Receiver<ModelEvent> {
        self.notifier.subscribe()
    }

    pub fn schema(&self) -> &Arc<SchemaStore> {
        &self.schema
    }

    /// Current frame settings
    pub fn config(&self) -> PipelineConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn operation_mode(&self) -> OperationMode {
        self.config().operation_mode
    }

    pub fn set_config(&self, config: PipelineConfig) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    pub fn set_operation_mode(&self, mode: OperationMode) {
        tracing::info!("Operation mode set to {}", mode);
        self.update_config(|c| c.operation_mode = mode);
    }

    pub fn set_decoder_method(&self, method: DecoderMethod) {
        tracing::info!("Decoder method set to {}", method);
        self.update_config(|c| c.decoder_method = method);
    }

    pub fn set_separator(&self, separator: impl Into<String>) {
        let separator = separator.into();
        self.update_config(|c| c.separator = separator);
    }

    /// Replace the manual-mode field extractor; `None` disables manual mapping
    pub fn set_frame_parser(&self, parser: Option<Arc<dyn FrameParser>>) {
        self.mapper
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_parser(parser);
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats.snapshot()
    }

    /// Map one frame without publishing it.
    ///
    /// Returns `Ok(None)` for an empty buffer.
    pub fn process(&self, bytes: &[u8]) -> Result<Option<SchemaDocument>> {
        if bytes.is_empty() {
            return Ok(None);
        }

        let config = self.config();
        let frame = match config.operation_mode {
            OperationMode::Automatic => Frame::Automatic(bytes),
            OperationMode::Manual => Frame::Manual {
                bytes,
                decoder: config.decoder_method,
                separator: &config.separator,
            },
        };

        let schema = self.schema.current();
        let mapper = self.mapper.read().unwrap_or_else(PoisonError::into_inner);
        mapper.map(&frame, &schema).map(Some)
    }

    /// Handle one frame from the transport.
    ///
    /// Returns whether a document was published.
    pub fn frame_received(&self, bytes: &[u8]) -> bool {
        if bytes.is_empty() {
            return false;
        }
        self.stats.frames_received.fetch_add(1, Ordering::Relaxed);

        match self.process(bytes) {
            Ok(Some(document)) => {
                if self.notifier.publish(document) {
                    self.stats.models_published.fetch_add(1, Ordering::Relaxed);
                    true
                } else {
                    self.stats.empty_suppressed.fetch_add(1, Ordering::Relaxed);
                    false
                }
            }
            Ok(None) => false,
            Err(e) => {
                tracing::debug!("Dropping frame ({} bytes): {}", bytes.len(), e);
                self.stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Run the command loop until `Shutdown` or until every sender is gone
    pub fn run(&self, commands: Receiver<PipelineCommand>) {
        tracing::info!("Frame pipeline started");

        for command in commands.iter() {
            match command {
                PipelineCommand::Frame(bytes) => {
                    self.frame_received(&bytes);
                }
                PipelineCommand::SetOperationMode(mode) => self.set_operation_mode(mode),
                PipelineCommand::SetDecoderMethod(method) => self.set_decoder_method(method),
                PipelineCommand::SetSeparator(separator) => self.set_separator(separator),
                PipelineCommand::Shutdown => break,
            }
        }

        let stats = self.stats();
        tracing::info!(
            "Frame pipeline stopped: {} frames, {} published, {} dropped, {} empty",
            stats.frames_received,
            stats.models_published,
            stats.frames_dropped,
            stats.empty_suppressed
        );
    }

    fn update_config(&self, f: impl FnOnce(&mut PipelineConfig)) {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *config);
    }
}
