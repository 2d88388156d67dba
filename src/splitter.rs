//! Field extraction.
//!
//! [`split_fields`] is the minimal splitting rule every frame parser must
//! satisfy. [`FrameParser`] is the seam the pipeline calls in manual mode;
//! [`SeparatorSplitter`] implements it with `split_fields`, while
//! [`crate::scripting::ScriptFrameParser`] delegates to a user script.

use crate::error::Result;

/// Split frame text into its fields.
///
/// - Empty text yields no fields.
/// - An empty separator yields the whole text as one field.
/// - Otherwise the text is split on every non-overlapping occurrence of
///   `separator`, keeping empty fields between adjacent separators.
pub fn split_fields(text: &str, separator: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if separator.is_empty() {
        return vec![text.to_string()];
    }
    text.split(separator).map(str::to_string).collect()
}

/// Turns decoded frame text into an ordered list of fields
#[cfg_attr(test, mockall::automock)]
pub trait FrameParser: Send + Sync {
    /// Extract the fields of one frame
    fn parse(&self, frame: &str, separator: &str) -> Result<Vec<String>>;
}

/// Frame parser that applies [`split_fields`] and nothing else
#[derive(Debug, Clone, Copy, Default)]
pub struct SeparatorSplitter;

impl SeparatorSplitter {
    pub fn new() -> Self {
        Self
    }
}

impl FrameParser for SeparatorSplitter {
    fn parse(&self, frame: &str, separator: &str) -> Result<Vec<String>> {
        Ok(split_fields(frame, separator))
    }
}
