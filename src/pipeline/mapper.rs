//! Frame mapping: one frame in, one populated document out.
//!
//! The two operation modes are separate code paths behind the [`Frame`]
//! enum:
//!
//! - **Automatic**: the frame bytes are parsed as a document on their own.
//! - **Manual**: the frame is decoded to text, split into fields by the
//!   configured [`FrameParser`], and the fields are written into a copy of
//!   the schema snapshot by 1-based dataset index.
//!
//! The schema snapshot is only ever read; every result is a fresh document.

use crate::decoder::{decode_frame, DecoderMethod};
use crate::error::{FrameMapError, Result};
use crate::splitter::{FrameParser, SeparatorSplitter};
use crate::types::SchemaDocument;
use serde_json::Value;
use std::sync::Arc;

/// A single incoming frame, tagged with how it must be interpreted
#[derive(Debug, Clone, Copy)]
pub enum Frame<'a> {
    /// The bytes are a complete JSON document
    Automatic(&'a [u8]),
    /// The bytes are a delimited value list
    Manual {
        bytes: &'a [u8],
        decoder: DecoderMethod,
        separator: &'a str,
    },
}

/// Maps frames to populated documents
#[derive(Clone)]
pub struct FrameMapper {
    parser: Option<Arc<dyn FrameParser>>,
}

impl FrameMapper {
    /// Mapper using the plain separator split for manual frames
    pub fn new() -> Self {
        Self::with_parser(Arc::new(SeparatorSplitter::new()))
    }

    /// Mapper using a custom field extractor
    pub fn with_parser(parser: Arc<dyn FrameParser>) -> Self {
        Self {
            parser: Some(parser),
        }
    }

    /// Mapper with no field extractor; manual frames are rejected
    pub fn without_parser() -> Self {
        Self { parser: None }
    }

    pub fn set_parser(&mut self, parser: Option<Arc<dyn FrameParser>>) {
        self.parser = parser;
    }

    pub fn has_parser(&self) -> bool {
        self.parser.is_some()
    }

    /// Map one frame against `schema`
    pub fn map(&self, frame: &Frame<'_>, schema: &SchemaDocument) -> Result<SchemaDocument> {
        match *frame {
            Frame::Automatic(bytes) => map_automatic(bytes),
            Frame::Manual {
                bytes,
                decoder,
                separator,
            } => self.map_manual(bytes, decoder, separator, schema),
        }
    }

    /// Decode, split and populate a manual-mode frame
    pub fn map_manual(
        &self,
        bytes: &[u8],
        decoder: DecoderMethod,
        separator: &str,
        schema: &SchemaDocument,
    ) -> Result<SchemaDocument> {
        let parser = self.parser.as_ref().ok_or(FrameMapError::MissingParser)?;
        let decoded = decode_frame(bytes, decoder, separator);
        let fields = parser.parse(&decoded.text, &decoded.separator)?;
        Ok(populate(schema, &fields))
    }
}

impl Default for FrameMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameMapper")
            .field("has_parser", &self.has_parser())
            .finish()
    }
}

/// Parse an automatic-mode frame; the frame itself is the result
pub fn map_automatic(bytes: &[u8]) -> Result<SchemaDocument> {
    SchemaDocument::from_slice(bytes).map_err(|e| FrameMapError::FrameParse(e.to_string()))
}

/// Copy `schema` and fill each dataset whose index falls in `1..=fields.len()`.
///
/// Datasets with any other index keep their schema value.
pub fn populate(schema: &SchemaDocument, fields: &[String]) -> SchemaDocument {
    let mut populated = schema.clone();
    for dataset in populated
        .groups
        .iter_mut()
        .flat_map(|g| g.datasets.iter_mut())
    {
        if let Some(field) = field_for(dataset.field_index(), fields) {
            dataset.set_value(Value::String(field.clone()));
        }
    }
    populated
}

fn field_for(index: i64, fields: &[String]) -> Option<&String> {
    let position = usize::try_from(index).ok()?.checked_sub(1)?;
    fields.get(position)
}
