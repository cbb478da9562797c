//! Declaration Loader
//!
//! Reads one declaration file, parses JSON, validates, and wraps the result
//! in a [`PackageRecord`]. Touches no shared state.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use super::types::Declaration;
use crate::common::normalize_path;
use crate::record::PackageRecord;
use crate::version::parse_version;

/// Declarations larger than this are refused
pub const MAX_DECLARATION_BYTES: u64 = 1_000_000;

/// Why a declaration could not become a package record
#[derive(Debug, thiserror::Error)]
pub enum DeclarationError {
    #[error("Declaration file does not exist: {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {detail}")]
    Parse { path: PathBuf, detail: String },

    #[error("Declaration {0:?} has an empty ModName")]
    MissingName(PathBuf),

    #[error("Declaration {path:?} has an invalid {field} '{value}'")]
    InvalidVersion {
        path: PathBuf,
        field: &'static str,
        value: String,
    },
}

/// Load the declaration `filename` inside `directory`.
///
/// The record's directory is normalised to an absolute path.
pub fn load_record(directory: &Path, filename: &str) -> Result<PackageRecord, DeclarationError> {
    let path = directory.join(filename);
    if !path.is_file() {
        return Err(DeclarationError::NotFound(path));
    }

    let io_err = |source: std::io::Error| DeclarationError::Io {
        path: path.clone(),
        source,
    };

    let metadata = fs::metadata(&path).map_err(io_err)?;
    if metadata.len() > MAX_DECLARATION_BYTES {
        return Err(DeclarationError::Parse {
            path: path.clone(),
            detail: "declaration file too large (max 1MB)".to_string(),
        });
    }

    let content = fs::read_to_string(&path).map_err(io_err)?;
    let declaration: Declaration =
        serde_json::from_str(&content).map_err(|e| DeclarationError::Parse {
            path: path.clone(),
            detail: e.to_string(),
        })?;

    validate(&declaration, &path)?;

    let directory = normalize_path(directory).map_err(|e| DeclarationError::Parse {
        path: path.clone(),
        detail: e.to_string(),
    })?;

    debug!(
        "Parsed declaration: {} ({:?})",
        declaration.mod_name, path
    );
    Ok(PackageRecord::new(declaration, directory, filename))
}

/// Like [`load_record`], but logs the failure reason and returns `None`
pub fn try_load_record(directory: &Path, filename: &str) -> Option<PackageRecord> {
    match load_record(directory, filename) {
        Ok(record) => Some(record),
        Err(e @ DeclarationError::Parse { .. }) => {
            error!("{} - please check it for syntax errors", e);
            None
        }
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}

/// Check the name and version bounds. `path` only labels the error.
pub(crate) fn validate(declaration: &Declaration, path: &Path) -> Result<(), DeclarationError> {
    if declaration.mod_name.trim().is_empty() {
        return Err(DeclarationError::MissingName(path.to_path_buf()));
    }

    let bounds = [
        ("MinimumLavenderVersion", &declaration.minimum_host_version),
        ("MaximumLavenderVersion", &declaration.maximum_host_version),
    ];
    for (field, value) in bounds {
        if let Some(value) = value {
            if parse_version(value).is_err() {
                return Err(DeclarationError::InvalidVersion {
                    path: path.to_path_buf(),
                    field,
                    value: value.clone(),
                });
            }
        }
    }

    Ok(())
}
