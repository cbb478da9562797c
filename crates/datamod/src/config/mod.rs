//! Configuration management
//!
//! Reads pipeline settings from a JSON file.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::common::{DatamodError, DatamodResult};
use crate::declaration::DECLARATION_FILENAME;
use crate::version::parse_version;

/// Version reported by the host when settings do not override it
pub const DEFAULT_HOST_VERSION: &str = env!("CARGO_PKG_VERSION");

/// On-disk settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master switch; when false the pipeline is skipped entirely
    pub enable_data_only_mods: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_version: Option<String>,
    pub search_roots: Vec<PathBuf>,
    pub declaration_filename: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_data_only_mods: true,
            host_version: None,
            search_roots: Vec::new(),
            declaration_filename: DECLARATION_FILENAME.to_string(),
        }
    }
}

impl Settings {
    /// Read settings from `path`
    pub fn load(path: &Path) -> DatamodResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)
            .map_err(|e| DatamodError::config(path, format!("failed to parse settings: {}", e)))?;

        if settings.declaration_filename.trim().is_empty() {
            return Err(DatamodError::config(path, "declaration_filename cannot be empty"));
        }
        Ok(settings)
    }

    /// Read settings from `path`, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> DatamodResult<Self> {
        if !path.exists() {
            info!("Settings file does not exist: {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Build the pipeline configuration, parsing the host version
    pub fn pipeline_config(&self) -> DatamodResult<PipelineConfig> {
        let host_version = parse_version(
            self.host_version
                .as_deref()
                .unwrap_or(DEFAULT_HOST_VERSION),
        )?;
        Ok(PipelineConfig {
            enabled: self.enable_data_only_mods,
            host_version,
            declaration_filename: self.declaration_filename.clone(),
        })
    }
}

/// What the pipeline needs at run time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub enabled: bool,
    pub host_version: Version,
    pub declaration_filename: String,
}

impl PipelineConfig {
    pub fn new(host_version: Version) -> Self {
        Self {
            enabled: true,
            host_version,
            declaration_filename: DECLARATION_FILENAME.to_string(),
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_declaration_filename(mut self, filename: impl Into<String>) -> Self {
        self.declaration_filename = filename.into();
        self
    }
}
