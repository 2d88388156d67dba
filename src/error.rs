//! Error handling for framemap-rs
//!
//! This module defines the crate error type and a Result alias. Errors fall
//! in two families:
//!
//! - **Load errors** (`Io`, `Parse`, `Config`) are terminal for one schema
//!   load or settings write and are surfaced to the user.
//! - **Frame-local errors** (`FrameParse`, `MissingParser`, `Script`) only
//!   affect the frame being processed; the pipeline drops that frame and
//!   carries on with the next one.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for framemap-rs operations
#[derive(Error, Debug)]
pub enum FrameMapError {
    /// The schema file could not be opened or read
    #[error("Cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The schema file is not a well-formed schema document.
    ///
    /// `line` is 0 for shape errors, which have no position in the text.
    #[error("{message}{}", position(.line, .column))]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    /// An automatic-mode frame is not a structured document
    #[error("Frame is not a valid document: {0}")]
    FrameParse(String),

    /// Manual mode was entered without a field-extraction collaborator
    #[error("No frame parser configured for manual mode")]
    MissingParser,

    /// Errors raised by a scripted frame parser
    #[error("Script error: {0}")]
    Script(String),

    /// Errors related to application state loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<FrameMapError>,
    },
}

impl FrameMapError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        FrameMapError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a parse error from a `serde_json` failure, keeping its position
    pub fn from_json(err: &serde_json::Error) -> Self {
        let text = err.to_string();
        let suffix = format!(" at line {} column {}", err.line(), err.column());
        let message = match text.strip_suffix(&suffix) {
            Some(message) if err.line() > 0 => message.to_string(),
            _ => text,
        };
        FrameMapError::Parse {
            message,
            line: err.line(),
            column: err.column(),
        }
    }

    /// Create a script error from a Rhai error
    pub fn from_rhai_error(err: Box<rhai::EvalAltResult>) -> Self {
        FrameMapError::Script(err.to_string())
    }

    /// The innermost error, with context wrappers peeled off
    pub fn root(&self) -> &FrameMapError {
        match self {
            FrameMapError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether this error only concerns the frame being processed
    pub fn is_frame_local(&self) -> bool {
        matches!(
            self.root(),
            FrameMapError::FrameParse(_) | FrameMapError::MissingParser | FrameMapError::Script(_)
        )
    }

    /// Title shown by the UI collaborator when a load fails
    pub fn user_title(&self) -> &'static str {
        match self.root() {
            FrameMapError::Io { .. } => "Cannot read JSON file",
            FrameMapError::Parse { .. } => "JSON parse error",
            FrameMapError::Config(_) => "Configuration error",
            _ => "Frame error",
        }
    }

    /// Message shown by the UI collaborator when a load fails
    pub fn user_message(&self) -> String {
        match self.root() {
            FrameMapError::Io { .. } => "Please check file permissions & location".to_string(),
            FrameMapError::Parse { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

fn position(line: &usize, column: &usize) -> String {
    if *line == 0 {
        String::new()
    } else {
        format!(" at line {}, column {}", line, column)
    }
}

/// Result type alias for framemap-rs operations
pub type Result<T> = std::result::Result<T, FrameMapError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, Box<rhai::EvalAltResult>> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| FrameMapError::from_rhai_error(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| FrameMapError::from_rhai_error(e).with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameMapError::Script("parse is not defined".to_string());
        assert_eq!(err.to_string(), "Script error: parse is not defined");
    }

    #[test]
    fn test_error_with_context() {
        let err = FrameMapError::MissingParser;
        let with_ctx = err.with_context("Frame 12");
        assert!(with_ctx.to_string().contains("Frame 12"));
        assert!(with_ctx.is_frame_local());
    }

    #[test]
    fn test_parse_error_keeps_position() {
        let json_err = serde_json::from_str::<serde_json::Value>("{\n  \"groups\": [,]\n}")
            .unwrap_err();
        let err = FrameMapError::from_json(&json_err);
        match &err {
            FrameMapError::Parse { line, .. } => assert_eq!(*line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.user_title(), "JSON parse error");
        assert!(!err.is_frame_local());
    }

    #[test]
    fn test_parse_error_position_printed_once() {
        let json_err = serde_json::from_str::<serde_json::Value>("{\n  \"groups\": [,]\n}")
            .unwrap_err();
        let err = FrameMapError::from_json(&json_err);
        let text = err.to_string();
        assert!(text.starts_with("expected value at line 2, column "), "{text}");
        assert_eq!(text.matches("line").count(), 1, "{text}");
        assert_eq!(err.user_message(), "expected value");
    }

    #[test]
    fn test_shape_error_has_no_position() {
        let json_err = serde_json::from_value::<Vec<String>>(serde_json::json!({"a": 1}))
            .unwrap_err();
        let err = FrameMapError::from_json(&json_err);
        let text = err.to_string();
        assert!(text.starts_with("invalid type: map"), "{text}");
        assert!(!text.contains("line"), "{text}");
    }

    #[test]
    fn test_io_error_user_text() {
        let err = FrameMapError::Io {
            path: PathBuf::from("/missing/map.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.user_title(), "Cannot read JSON file");
        assert_eq!(err.user_message(), "Please check file permissions & location");
    }
}
