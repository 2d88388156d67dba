//! Frame-to-model pipeline.
//!
//! Frames flow through decoding, field extraction and mapping, and the
//! populated document is published to subscribers:
//!
//! ```text
//! bytes ──► [decode_frame] ──► [FrameParser] ──► [populate] ──► [Notifier] ──► subscribers
//!   │                                                ▲
//!   └── automatic mode: parsed as a document ────────┘
//! ```
//!
//! # Design
//!
//! - **Explicit context**: `FramePipeline` owns the frame settings and the
//!   field extractor; the schema store is injected, not global.
//! - **Tagged frames**: `Frame::Automatic` and `Frame::Manual` are mapped
//!   by separate functions.
//! - **Copy, never mutate**: mapping clones the schema snapshot and fills
//!   the copy.
//! - **Dedicated thread**: `PipelineBridge` feeds frames to a pipeline
//!   thread over a crossbeam channel.

pub mod bridge;
pub mod executor;
pub mod mapper;
pub mod notifier;

pub use bridge::{PipelineBridge, PipelineCommand};
pub use executor::{FramePipeline, PipelineStats};
pub use mapper::{map_automatic, populate, Frame, FrameMapper};
pub use notifier::{ModelEvent, Notifier};
