//! Frame text decoding.
//!
//! Converts a raw frame buffer into the text handed to the field extractor,
//! and picks the separator that goes with it:
//!
//! | Method        | Text                          | Separator          |
//! |---------------|-------------------------------|--------------------|
//! | `Normal`      | UTF-8 (invalid bytes → U+FFFD) | transport separator |
//! | `Hexadecimal` | lowercase hex of the bytes    | empty              |
//! | `Base64`      | standard base64 of the bytes  | empty              |
//!
//! Decoding is total: every byte sequence produces some text.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// How frame bytes are rendered to text before field extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DecoderMethod {
    /// Bytes are UTF-8 text
    #[default]
    Normal,
    /// Bytes are rendered as a lowercase hex string
    Hexadecimal,
    /// Bytes are rendered as a standard base64 string
    Base64,
}

impl DecoderMethod {
    /// Map a persisted integer code to a method.
    ///
    /// Unknown codes fall back to `Normal`.
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => DecoderMethod::Hexadecimal,
            2 => DecoderMethod::Base64,
            _ => DecoderMethod::Normal,
        }
    }

    /// Integer code used when persisting
    pub fn index(&self) -> i64 {
        match self {
            DecoderMethod::Normal => 0,
            DecoderMethod::Hexadecimal => 1,
            DecoderMethod::Base64 => 2,
        }
    }
}

impl From<i64> for DecoderMethod {
    fn from(index: i64) -> Self {
        Self::from_index(index)
    }
}

impl std::fmt::Display for DecoderMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecoderMethod::Normal => write!(f, "Plain Text (UTF8)"),
            DecoderMethod::Hexadecimal => write!(f, "Hexadecimal"),
            DecoderMethod::Base64 => write!(f, "Base64"),
        }
    }
}

/// A frame rendered to text, with the separator to split it on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub separator: String,
}

/// Render `bytes` to text according to `method`.
///
/// `separator` is only used in `Normal` mode; the binary encodings always
/// yield an empty separator so the whole encoded blob stays one field.
pub fn decode_frame(bytes: &[u8], method: DecoderMethod, separator: &str) -> DecodedText {
    match method {
        DecoderMethod::Normal => DecodedText {
            text: String::from_utf8_lossy(bytes).into_owned(),
            separator: separator.to_string(),
        },
        DecoderMethod::Hexadecimal => DecodedText {
            text: hex::encode(bytes),
            separator: String::new(),
        },
        DecoderMethod::Base64 => DecodedText {
            text: STANDARD.encode(bytes),
            separator: String::new(),
        },
    }
}
