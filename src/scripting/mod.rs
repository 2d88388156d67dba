//! Rhai Scripting for Frame Parsers
//!
//! A schema file may carry a `frameParser` script that replaces the plain
//! separator split in manual mode. The script must define:
//!
//! ```rhai
//! fn parse(frame, separator) {
//!     frame.split(separator)
//! }
//! ```
//!
//! `frame` is the decoded frame text and `separator` the separator chosen by
//! the decoder (empty for hex and base64 frames). The function returns an
//! array; each element becomes one field. Non-string elements are converted
//! with their display form.
//!
//! ## Example Scripts
//!
//! Dropping a leading frame tag:
//! ```rhai
//! fn parse(frame, separator) {
//!     let fields = frame.split(separator);
//!     fields.remove(0);
//!     fields
//! }
//! ```
//!
//! Cutting a hex frame into bytes:
//! ```rhai
//! fn parse(frame, separator) {
//!     let fields = [];
//!     let i = 0;
//!     while i < frame.len() {
//!         fields.push(frame.sub_string(i, 2));
//!         i += 2;
//!     }
//!     fields
//! }
//! ```

mod engine;

pub use engine::{ScriptFrameParser, PARSE_FN};

/// Built-in parser scripts for common use cases
pub mod builtins {
    /// Split on the separator, same as the default parser: empty text has
    /// no fields and an empty separator keeps the text whole
    pub const SPLIT: &str = r#"
fn parse(frame, separator) {
    if frame == "" { return []; }
    if separator == "" { return [frame]; }
    frame.split(separator)
}
"#;

    /// Split a hex-decoded frame into one field per byte
    pub const HEX_BYTES: &str = r#"
fn parse(frame, separator) {
    let fields = [];
    let i = 0;
    while i < frame.len() {
        fields.push(frame.sub_string(i, 2));
        i += 2;
    }
    fields
}
"#;
}
