//! Configuration module for framemap-rs
//!
//! This module handles persisted state:
//! - The last successfully loaded schema file, restored at startup
//! - Frame settings (operation mode, decoder method, separator)
//!
//! # App Data Location
//!
//! Application data is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/dev.framemap.framemap-rs/`
//! - **macOS**: `~/Library/Application Support/dev.framemap.framemap-rs/`
//! - **Windows**: `%APPDATA%\dev.framemap.framemap-rs\`
//!
//! # Files
//!
//! - `app_state.json` - Last schema path and frame settings
//!
//! # Example
//!
//! ```ignore
//! use framemap_rs::config::AppState;
//!
//! let mut state = AppState::load_or_default();
//! state.set_last_schema("maps/weather.json");
//! state.save()?;
//! ```

use crate::decoder::DecoderMethod;
use crate::error::{FrameMapError, Result};
use crate::types::OperationMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.framemap.framemap-rs";

/// App state filename
pub const APP_STATE_FILE: &str = "app_state.json";

/// Separator used when none is configured
pub const DEFAULT_SEPARATOR: &str = ",";

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the app state file
pub fn app_state_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(APP_STATE_FILE))
}

// ==================== Pipeline Config ====================

/// Per-frame settings read by the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Whether frames are JSON documents or delimited values
    #[serde(default)]
    pub operation_mode: OperationMode,

    /// How frame bytes are rendered to text in manual mode
    #[serde(default)]
    pub decoder_method: DecoderMethod,

    /// Field separator for `Normal` decoding
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            operation_mode: OperationMode::default(),
            decoder_method: DecoderMethod::default(),
            separator: default_separator(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation_mode(mut self, mode: OperationMode) -> Self {
        self.operation_mode = mode;
        self
    }

    pub fn with_decoder_method(mut self, method: DecoderMethod) -> Self {
        self.decoder_method = method;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

// ==================== App State ====================

/// Persistent application state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Version for future migration support
    #[serde(default = "default_app_state_version")]
    pub version: u32,

    /// Path of the last schema that loaded successfully
    #[serde(default)]
    pub last_schema_path: Option<PathBuf>,

    /// Frame settings
    #[serde(default)]
    pub frame: PipelineConfig,
}

fn default_app_state_version() -> u32 {
    1
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: 1,
            last_schema_path: None,
            frame: PipelineConfig::default(),
        }
    }
}

impl AppState {
    /// Load app state from the default location
    pub fn load() -> Result<Self> {
        let path = app_state_path().ok_or_else(|| {
            FrameMapError::Config("Could not determine app state path".to_string())
        })?;
        Self::load_from(path)
    }

    /// Load app state from `path`; a missing file yields defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| FrameMapError::Config(format!("Failed to read app state: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| FrameMapError::Config(format!("Failed to parse app state: {}", e)))
    }

    /// Load app state, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load app state, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save app state to the default location
    pub fn save(&self) -> Result<()> {
        let path = app_state_path().ok_or_else(|| {
            FrameMapError::Config("Could not determine app state path".to_string())
        })?;
        self.save_to(path)
    }

    /// Save app state to `path`, creating parent directories as needed
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FrameMapError::Config(format!("Failed to create app data directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| FrameMapError::Config(format!("Failed to serialize app state: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| FrameMapError::Config(format!("Failed to write app state: {}", e)))
    }

    /// Remember a schema path for the next session
    pub fn set_last_schema(&mut self, path: impl AsRef<Path>) {
        self.last_schema_path = Some(path.as_ref().to_path_buf());
    }

    /// Forget the remembered schema path
    pub fn clear_last_schema(&mut self) {
        self.last_schema_path = None;
    }

    /// The remembered schema path, if any
    pub fn get_last_schema(&self) -> Option<&Path> {
        self.last_schema_path.as_deref()
    }
}

// ==================== App State File ====================

/// Location the schema store persists its last good path to.
///
/// A disabled handle keeps everything in memory, for tests and embedders
/// that manage their own settings.
#[derive(Debug, Clone, Default)]
pub struct AppStateFile {
    path: Option<PathBuf>,
}

impl AppStateFile {
    /// The platform app data location
    pub fn default_location() -> Self {
        Self {
            path: app_state_path(),
        }
    }

    /// A specific file
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// No persistence
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the state, falling back to defaults
    pub fn read(&self) -> AppState {
        let Some(path) = &self.path else {
            return AppState::default();
        };
        AppState::load_from(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load app state, using defaults: {}", e);
            AppState::default()
        })
    }

    /// The remembered schema path
    pub fn last_schema(&self) -> Option<PathBuf> {
        self.read().last_schema_path
    }

    /// Persist `path` as the last good schema, or forget it when `None`.
    ///
    /// Write failures are logged; they never fail a schema load.
    pub fn remember_schema(&self, path: Option<&Path>) {
        let Some(file) = &self.path else {
            return;
        };

        let mut state = self.read();
        match path {
            Some(p) => state.set_last_schema(p),
            None => state.clear_last_schema(),
        }

        if let Err(e) = state.save_to(file) {
            tracing::warn!("Failed to persist schema location: {}", e);
        }
    }

    /// Persist frame settings
    pub fn remember_frame_settings(&self, config: &PipelineConfig) {
        let Some(file) = &self.path else {
            return;
        };

        let mut state = self.read();
        state.frame = config.clone();
        if let Err(e) = state.save_to(file) {
            tracing::warn!("Failed to persist frame settings: {}", e);
        }
    }
}

// ==================== Tests ====================
