//! framemap - headless frame mapper
//!
//! Reads one frame per line from stdin (or `--input`), feeds the frames
//! through the pipeline and prints every published document as one JSON
//! line on stdout. Logs go to stderr or to `--log-file`.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use framemap_rs::{
    config::{AppStateFile, PipelineConfig},
    pipeline::{FramePipeline, ModelEvent, Notifier, PipelineBridge},
    schema::SchemaStore,
    DecoderMethod, FrameParser, OperationMode, ScriptFrameParser, SeparatorSplitter,
};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "framemap", version, about = "Map device frames to a structured data model")]
struct Args {
    /// JSON map file (defaults to the last one loaded successfully)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Operation mode
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// How manual frames are decoded before splitting
    #[arg(short, long, value_enum)]
    decoder: Option<DecoderArg>,

    /// Field separator for plain-text frames
    #[arg(long)]
    separator: Option<String>,

    /// Rhai frame parser script, overriding the one in the schema
    #[arg(long)]
    parser_script: Option<PathBuf>,

    /// Read frames from a file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Do not reload the last schema
    #[arg(long)]
    no_restore: bool,

    /// Remember the frame settings for the next run
    #[arg(long)]
    save_settings: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Manual,
    Automatic,
}

impl From<ModeArg> for OperationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Manual => OperationMode::Manual,
            ModeArg::Automatic => OperationMode::Automatic,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DecoderArg {
    Normal,
    Hex,
    Base64,
}

impl From<DecoderArg> for DecoderMethod {
    fn from(decoder: DecoderArg) -> Self {
        match decoder {
            DecoderArg::Normal => DecoderMethod::Normal,
            DecoderArg::Hex => DecoderMethod::Hexadecimal,
            DecoderArg::Base64 => DecoderMethod::Base64,
        }
    }
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,framemap_rs=debug"));

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid log file path {:?}", path))?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
    Ok(Some(guard))
}

fn frame_settings(args: &Args, state: &AppStateFile) -> PipelineConfig {
    let mut config = state.read().frame;
    if let Some(mode) = args.mode {
        config.operation_mode = mode.into();
    }
    if let Some(decoder) = args.decoder {
        config.decoder_method = decoder.into();
    }
    if let Some(separator) = &args.separator {
        config.separator = separator.clone();
    }
    config
}

/// Pick the field extractor: explicit script, then the schema's script, then plain split
fn frame_parser(args: &Args, store: &SchemaStore) -> anyhow::Result<Arc<dyn FrameParser>> {
    if let Some(path) = &args.parser_script {
        let parser = ScriptFrameParser::from_file(path)
            .with_context(|| format!("Failed to load parser script {:?}", path))?;
        return Ok(Arc::new(parser));
    }

    if let Some(source) = store.frame_parser_source() {
        match ScriptFrameParser::new(&source) {
            Ok(parser) => {
                tracing::info!("Using frame parser from {}", store.file_name());
                return Ok(Arc::new(parser));
            }
            Err(e) => tracing::warn!("Ignoring frame parser in schema: {}", e),
        }
    }

    Ok(Arc::new(SeparatorSplitter::new()))
}

fn print_events(events: crossbeam_channel::Receiver<ModelEvent>) {
    let stdout = std::io::stdout();
    for event in events.iter() {
        match event {
            ModelEvent::ModelReady(doc) => {
                let mut out = stdout.lock();
                if writeln!(out, "{}", doc.to_json()).is_err() {
                    break;
                }
            }
            ModelEvent::LoadFailed { title, message } => {
                eprintln!("{}: {}", title, message);
            }
            ModelEvent::SchemaChanged { path } => {
                tracing::debug!("Schema changed: {:?}", path);
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(args.log_file.as_deref())?;

    tracing::info!("Starting framemap");

    let state_file = AppStateFile::default_location();
    let config = frame_settings(&args, &state_file);
    if args.save_settings {
        state_file.remember_frame_settings(&config);
    }

    let store = Arc::new(SchemaStore::new(state_file, Notifier::new()));
    let pipeline = Arc::new(FramePipeline::new(store.clone(), config));
    let (bridge, cmd_rx) = PipelineBridge::new(&pipeline);

    let printer = {
        let events = bridge.event_rx.clone();
        std::thread::spawn(move || print_events(events))
    };

    // Load failures are reported through the event stream
    match &args.schema {
        Some(path) => {
            let _ = store.load(path);
        }
        None if !args.no_restore => {
            let _ = store.restore();
        }
        None => {}
    }

    pipeline.set_frame_parser(Some(frame_parser(&args, &store)?));

    let worker = {
        let pipeline = pipeline.clone();
        std::thread::spawn(move || pipeline.run(cmd_rx))
    };

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            std::fs::File::open(path).with_context(|| format!("Failed to open {:?}", path))?,
        )),
        None => Box::new(std::io::stdin().lock()),
    };

    for line in reader.split(b'\n') {
        let mut frame = line.context("Failed to read input")?;
        if frame.last() == Some(&b'\r') {
            frame.pop();
        }
        if !bridge.frame_received(frame) {
            break;
        }
    }

    tracing::info!("Shutting down...");
    bridge.shutdown();
    if worker.join().is_err() {
        tracing::error!("Pipeline thread panicked");
    }

    let stats = pipeline.stats();
    tracing::info!(
        "{} frames, {} published, {} dropped",
        stats.frames_received,
        stats.models_published,
        stats.frames_dropped
    );

    // Dropping the last notifier handle ends the printer
    drop(pipeline);
    drop(store);
    drop(bridge);
    let _ = printer.join();

    Ok(())
}
