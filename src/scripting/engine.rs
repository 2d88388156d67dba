//! Rhai-backed frame parser
//!
//! Compiles the user script once and calls its `parse(frame, separator)`
//! function for every manual-mode frame.

use crate::error::{FrameMapError, Result, ResultExt};
use crate::splitter::FrameParser;
use rhai::{Array, Dynamic, Engine, Scope, AST};
use std::path::Path;

/// Name of the function every parser script must define
pub const PARSE_FN: &str = "parse";

/// Frame parser that runs a user Rhai script
pub struct ScriptFrameParser {
    /// The Rhai engine instance
    engine: Engine,
    /// The compiled script
    ast: AST,
    /// Script source as written
    source: String,
}

impl ScriptFrameParser {
    /// Compile a parser script.
    ///
    /// Fails if the script does not compile or does not define
    /// `parse(frame, separator)`.
    pub fn new(source: &str) -> Result<Self> {
        let mut engine = Engine::new();
        Self::configure_engine(&mut engine);

        let ast = engine
            .compile(source)
            .map_err(|e| FrameMapError::Script(format!("Compilation error: {}", e)))?;

        let has_parse = ast
            .iter_functions()
            .any(|f| f.name == PARSE_FN && f.params.len() == 2);
        if !has_parse {
            return Err(FrameMapError::Script(format!(
                "script must define fn {}(frame, separator)",
                PARSE_FN
            )));
        }

        Ok(Self {
            engine,
            ast,
            source: source.to_string(),
        })
    }

    /// Compile a parser script read from `path`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| FrameMapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(&source)
    }

    /// Get the source code of this parser
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Configure the Rhai engine with safety limits
    fn configure_engine(engine: &mut Engine) {
        engine.set_max_expr_depths(64, 64);
        engine.set_max_call_levels(32);
        engine.set_max_operations(100_000);
        engine.set_max_string_size(1_000_000);
        engine.set_max_array_size(10_000);
        engine.set_max_map_size(1_000);
    }

    fn into_field(value: Dynamic) -> String {
        if value.is_string() {
            value.into_string().unwrap_or_default()
        } else {
            value.to_string()
        }
    }
}

impl FrameParser for ScriptFrameParser {
    fn parse(&self, frame: &str, separator: &str) -> Result<Vec<String>> {
        let mut scope = Scope::new();
        let result: Dynamic = self
            .engine
            .call_fn(
                &mut scope,
                &self.ast,
                PARSE_FN,
                (frame.to_string(), separator.to_string()),
            )
            .context("parse() failed")?;

        let fields = result.try_cast::<Array>().ok_or_else(|| {
            FrameMapError::Script(format!("{}() must return an array", PARSE_FN))
        })?;

        Ok(fields.into_iter().map(Self::into_field).collect())
    }
}

impl std::fmt::Debug for ScriptFrameParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptFrameParser")
            .field("source", &self.source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripting::builtins;
    use crate::splitter::split_fields;
    use proptest::prelude::*;

    #[test]
    fn test_split_script() {
        let parser = ScriptFrameParser::new(builtins::SPLIT).unwrap();
        assert_eq!(parser.parse("1,2,3", ",").unwrap(), vec!["1", "2", "3"]);
        assert_eq!(parser.parse("0aff", "").unwrap(), vec!["0aff"]);
        assert!(parser.parse("", ",").unwrap().is_empty());
    }

    #[test]
    fn test_hex_bytes_script() {
        let parser = ScriptFrameParser::new(builtins::HEX_BYTES).unwrap();
        assert_eq!(parser.parse("0aff7b", "").unwrap(), vec!["0a", "ff", "7b"]);
    }

    #[test]
    fn test_non_string_elements() {
        let parser = ScriptFrameParser::new(
            r#"
fn parse(frame, separator) {
    [frame.len(), true, "x"]
}
"#,
        )
        .unwrap();
        assert_eq!(parser.parse("abcd", ",").unwrap(), vec!["4", "true", "x"]);
    }

    #[test]
    fn test_missing_parse_fn() {
        let err = ScriptFrameParser::new("fn convert(raw) { raw }").unwrap_err();
        assert!(matches!(err, FrameMapError::Script(_)));
    }

    #[test]
    fn test_compile_error() {
        assert!(ScriptFrameParser::new("fn parse(frame, separator) {").is_err());
    }

    #[test]
    fn test_non_array_result_is_frame_local() {
        let parser = ScriptFrameParser::new("fn parse(frame, separator) { 42 }").unwrap();
        let err = parser.parse("1,2", ",").unwrap_err();
        assert!(err.is_frame_local());
    }

    #[test]
    fn test_runtime_error_is_frame_local() {
        let parser =
            ScriptFrameParser::new("fn parse(frame, separator) { throw \"bad frame\"; }").unwrap();
        let err = parser.parse("1,2", ",").unwrap_err();
        assert!(err.is_frame_local());
        assert!(err.to_string().contains("parse() failed"));
    }

    #[test]
    fn test_runaway_script_is_stopped() {
        let parser =
            ScriptFrameParser::new("fn parse(frame, separator) { loop {} }").unwrap();
        assert!(parser.parse("1", ",").is_err());
    }

    proptest! {
        #[test]
        fn test_split_script_matches_split_fields(
            text in "[a-z0-9,;]{0,16}",
            separator in prop_oneof![Just(""), Just(","), Just(";"), Just(",,")]
        ) {
            let parser = ScriptFrameParser::new(builtins::SPLIT).unwrap();
            prop_assert_eq!(
                parser.parse(&text, separator).unwrap(),
                split_fields(&text, separator)
            );
        }
    }
}
