//! Thread boundary between the transport and the pipeline thread.
//!
//! The transport side holds a `PipelineBridge`; the pipeline thread owns the
//! command receiver and runs [`FramePipeline::run`](super::FramePipeline::run).
//! Frames travel over a bounded channel, so a producer that outpaces the
//! pipeline blocks instead of growing memory. Model events come back over
//! the notifier's unbounded channel.

use crate::decoder::DecoderMethod;
use crate::pipeline::executor::FramePipeline;
use crate::pipeline::notifier::ModelEvent;
use crate::types::OperationMode;
use crossbeam_channel::{bounded, Receiver, Sender};

/// Commands sent from the transport/UI thread to the pipeline.
#[derive(Debug, Clone)]
pub enum PipelineCommand {
    /// One frame from the transport.
    Frame(Vec<u8>),
    /// Switch between manual and automatic mode.
    SetOperationMode(OperationMode),
    /// Change how manual frames are decoded.
    SetDecoderMethod(DecoderMethod),
    /// Change the field separator.
    SetSeparator(String),
    /// Stop the pipeline thread.
    Shutdown,
}

/// Channel capacity for commands (transport → pipeline).
const CMD_CHANNEL_CAPACITY: usize = 1024;

/// Transport-side handle for communicating with the pipeline thread.
pub struct PipelineBridge {
    pub cmd_tx: Sender<PipelineCommand>,
    pub event_rx: Receiver<ModelEvent>,
}

impl PipelineBridge {
    /// Create a bridge pair: `(bridge, cmd_rx)`.
    ///
    /// The pipeline thread owns `cmd_rx`; events are subscribed from
    /// `pipeline` before it starts running.
    pub fn new(pipeline: &FramePipeline) -> (Self, Receiver<PipelineCommand>) {
        let (cmd_tx, cmd_rx) = bounded(CMD_CHANNEL_CAPACITY);
        let event_rx = pipeline.subscribe();
        (Self { cmd_tx, event_rx }, cmd_rx)
    }

    /// Drain all pending events.
    pub fn drain(&self) -> Vec<ModelEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Try to receive a single event without blocking.
    pub fn try_recv(&self) -> Option<ModelEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn send_command(&self, cmd: PipelineCommand) -> bool {
        self.cmd_tx.send(cmd).is_ok()
    }

    /// Hand a frame to the pipeline; blocks while the queue is full.
    pub fn frame_received(&self, bytes: impl Into<Vec<u8>>) -> bool {
        self.send_command(PipelineCommand::Frame(bytes.into()))
    }

    pub fn set_operation_mode(&self, mode: OperationMode) {
        let _ = self.cmd_tx.send(PipelineCommand::SetOperationMode(mode));
    }

    pub fn set_decoder_method(&self, method: DecoderMethod) {
        let _ = self.cmd_tx.send(PipelineCommand::SetDecoderMethod(method));
    }

    pub fn set_separator(&self, separator: impl Into<String>) {
        let _ = self
            .cmd_tx
            .send(PipelineCommand::SetSeparator(separator.into()));
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(PipelineCommand::Shutdown);
    }
}
