//! Package Records
//!
//! Runtime wrapper around a [`Declaration`]: where it was found and how far
//! it got through the pipeline.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::{normalize_path, DatamodResult};
use crate::declaration::Declaration;

/// Loading state of a package
///
/// `Unloaded` is the only non-terminal state. The `Error*` states are sticky:
/// see [`PackageRecord::set_state`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingState {
    #[default]
    Unloaded,
    Loaded,
    ErrorIncompatibleVersion,
    ErrorDuplicateName,
    Error,
}

impl LoadingState {
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Self::ErrorIncompatibleVersion | Self::ErrorDuplicateName | Self::Error
        )
    }
}

impl fmt::Display for LoadingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unloaded => "unloaded",
            Self::Loaded => "loaded",
            Self::ErrorIncompatibleVersion => "incompatible version",
            Self::ErrorDuplicateName => "duplicate name",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// A discovered package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRecord {
    declaration: Declaration,
    /// Absolute directory the declaration was found in
    directory: PathBuf,
    declaration_filename: String,
    state: LoadingState,
}

impl PackageRecord {
    /// Wrap a declaration. The record starts `Unloaded`.
    ///
    /// The declaration and directory are checked and normalised when the
    /// record is handed to [`Registrar::add_candidate`].
    ///
    /// [`Registrar::add_candidate`]: crate::registrar::Registrar::add_candidate
    pub fn new(
        declaration: Declaration,
        directory: impl Into<PathBuf>,
        declaration_filename: impl Into<String>,
    ) -> Self {
        Self {
            declaration,
            directory: directory.into(),
            declaration_filename: declaration_filename.into(),
            state: LoadingState::Unloaded,
        }
    }

    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    pub fn mod_name(&self) -> &str {
        &self.declaration.mod_name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn declaration_filename(&self) -> &str {
        &self.declaration_filename
    }

    /// Make the directory absolute and fold away `.` and `..`
    pub(crate) fn normalize_directory(&mut self) -> DatamodResult<()> {
        self.directory = normalize_path(&self.directory)?;
        Ok(())
    }

    /// Full path of the declaration file
    pub fn declaration_path(&self) -> PathBuf {
        self.directory.join(&self.declaration_filename)
    }

    pub fn state(&self) -> LoadingState {
        self.state
    }

    pub fn is_errored(&self) -> bool {
        self.state.is_error()
    }

    /// Transition to `state`.
    ///
    /// An errored record only leaves its error state when
    /// `can_recover_from_error` is set. Returns whether the transition applied.
    pub fn set_state(&mut self, state: LoadingState, can_recover_from_error: bool) -> bool {
        if self.is_errored() && !can_recover_from_error {
            debug!(
                "Ignoring transition of {} from {} to {}",
                self.mod_name(),
                self.state,
                state
            );
            return false;
        }
        self.state = state;
        true
    }

    /// Whether `other` is the same candidate: same directory, declaration
    /// filename and package name.
    pub fn is_same_candidate(&self, other: &PackageRecord) -> bool {
        self.directory == other.directory
            && self.declaration_filename == other.declaration_filename
            && self.mod_name() == other.mod_name()
    }
}
