//! Path Utilities
//!
//! Default locations under `~/.datamod/` and lexical path normalisation.

use std::path::{Component, Path, PathBuf};

use super::result::DatamodResult;

/// Get the datamod base directory (`~/.datamod/`)
pub fn datamod_dir() -> DatamodResult<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "could not determine home directory",
        )
    })?;
    Ok(home.join(".datamod"))
}

/// Get a path within the datamod directory
///
/// # Example
/// ```ignore
/// let settings = datamod_path("settings.json")?;
/// ```
pub fn datamod_path(relative_path: &str) -> DatamodResult<PathBuf> {
    Ok(datamod_dir()?.join(relative_path))
}

/// Get the default settings file
pub fn default_settings_path() -> DatamodResult<PathBuf> {
    datamod_path("settings.json")
}

/// Get the default mods directory
pub fn default_mods_dir() -> DatamodResult<PathBuf> {
    datamod_path("mods")
}

/// Make `path` absolute against the current directory and fold away `.` and
/// `..` components without touching the file system.
///
/// The path does not need to exist. `..` at the root stays at the root.
pub fn normalize_path(path: &Path) -> DatamodResult<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if normalized.parent().is_some() {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
