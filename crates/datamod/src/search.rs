//! Package Search
//!
//! Walks a search root's immediate subdirectories and registers every one
//! holding a declaration file as a candidate.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::common::{normalize_path, DatamodResult};
use crate::declaration::try_load_record;
use crate::record::PackageRecord;
use crate::registrar::Registrar;

/// Extra acceptance test applied to each successfully parsed record
pub type CandidateFilter<'a> = &'a dyn Fn(&PackageRecord) -> bool;

/// Search `root` for packages declared by `declaration_filename`.
///
/// `root` is the housing directory: a package lives in `root/<PackageDir>/`.
/// Subdirectories are visited in sorted order. Returns the number of
/// candidates newly added to the pool.
///
/// Fails with [`DatamodError::InvalidState`] once discovery has closed. A
/// missing or unreadable root is logged and yields zero candidates.
///
/// [`DatamodError::InvalidState`]: crate::common::DatamodError::InvalidState
pub fn search_directory(
    registrar: &mut Registrar,
    root: &Path,
    declaration_filename: &str,
    filter: Option<CandidateFilter<'_>>,
) -> DatamodResult<usize> {
    registrar.ensure_discovery_open("package discovery has finished; cannot search for packages")?;

    let root = normalize_path(root)?;
    let package_dirs = match package_dirs(&root, declaration_filename) {
        Ok(dirs) => dirs,
        Err(e) => {
            warn!("Skipping search root {:?}: {}", root, e);
            return Ok(0);
        }
    };

    let mut added = 0;
    for dir in package_dirs {
        debug!("Inspecting {:?} for a package declaration", dir);

        let Some(record) = try_load_record(&dir, declaration_filename) else {
            debug!("No package loaded from {:?}", dir);
            continue;
        };

        if let Some(filter) = filter {
            if !filter(&record) {
                debug!(
                    "Package {} at {:?} skipped by search filter",
                    record.mod_name(),
                    record.declaration_path()
                );
                continue;
            }
        }

        if registrar.add_candidate(record)? {
            added += 1;
        }
    }

    Ok(added)
}

/// Immediate, non-hidden subdirectories of `root` containing `declaration_filename`
fn package_dirs(root: &Path, declaration_filename: &str) -> std::io::Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root)?.map(|entry| entry.map(|e| e.path()));
    Ok(select_package_dirs(root, entries, declaration_filename))
}

/// Entries that fail to read are logged and skipped
fn select_package_dirs(
    root: &Path,
    entries: impl IntoIterator<Item = std::io::Result<PathBuf>>,
    declaration_filename: &str,
) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Failed to read an entry of {:?}: {}", root, e);
                continue;
            }
        };

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                continue;
            }
        }

        if path.is_dir() && path.join(declaration_filename).is_file() {
            dirs.push(path);
        }
    }

    dirs.sort();
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::DatamodError;
    use crate::declaration::DECLARATION_FILENAME;
    use tempfile::TempDir;

    fn add_package(root: &Path, dir: &str, body: &str) {
        let path = root.join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join(DECLARATION_FILENAME), body).unwrap();
    }

    #[test]
    fn test_finds_packages_in_subdirectories() {
        let tmp = TempDir::new().unwrap();
        add_package(tmp.path(), "B", r#"{"ModName": "PackB"}"#);
        add_package(tmp.path(), "A", r#"{"ModName": "PackA"}"#);
        fs::create_dir_all(tmp.path().join("NotAPackage")).unwrap();
        fs::write(tmp.path().join(DECLARATION_FILENAME), r#"{"ModName": "Root"}"#).unwrap();

        let mut reg = Registrar::new();
        let added = search_directory(&mut reg, tmp.path(), DECLARATION_FILENAME, None).unwrap();

        assert_eq!(added, 2);
        let names: Vec<_> = reg.candidates().iter().map(|c| c.mod_name()).collect();
        assert_eq!(names, vec!["PackA", "PackB"]);
    }

    #[test]
    fn test_broken_declarations_are_skipped() {
        let tmp = TempDir::new().unwrap();
        add_package(tmp.path(), "Good", r#"{"ModName": "Good"}"#);
        add_package(tmp.path(), "Bad", "{ not json");
        add_package(tmp.path(), "Nameless", r#"{"Name": "x"}"#);

        let mut reg = Registrar::new();
        let added = search_directory(&mut reg, tmp.path(), DECLARATION_FILENAME, None).unwrap();
        assert_eq!(added, 1);
        assert_eq!(reg.candidates()[0].mod_name(), "Good");
    }

    #[test]
    fn test_filter_rejects_candidates() {
        let tmp = TempDir::new().unwrap();
        add_package(tmp.path(), "A", r#"{"ModName": "Keep"}"#);
        add_package(tmp.path(), "B", r#"{"ModName": "Drop"}"#);

        let mut reg = Registrar::new();
        let keep_only = |r: &PackageRecord| r.mod_name() == "Keep";
        let added =
            search_directory(&mut reg, tmp.path(), DECLARATION_FILENAME, Some(&keep_only)).unwrap();
        assert_eq!(added, 1);
        assert_eq!(reg.candidates()[0].mod_name(), "Keep");
    }

    #[test]
    fn test_custom_declaration_filename() {
        let tmp = TempDir::new().unwrap();
        add_package(tmp.path(), "A", r#"{"ModName": "Default"}"#);
        let alt = tmp.path().join("B");
        fs::create_dir_all(&alt).unwrap();
        fs::write(alt.join("pack.json"), r#"{"ModName": "Alt"}"#).unwrap();

        let mut reg = Registrar::new();
        search_directory(&mut reg, tmp.path(), "pack.json", None).unwrap();
        assert_eq!(reg.candidates().len(), 1);
        assert_eq!(reg.candidates()[0].mod_name(), "Alt");
    }

    #[test]
    fn test_repeat_search_adds_nothing() {
        let tmp = TempDir::new().unwrap();
        add_package(tmp.path(), "A", r#"{"ModName": "PackA"}"#);

        let mut reg = Registrar::new();
        assert_eq!(search_directory(&mut reg, tmp.path(), DECLARATION_FILENAME, None).unwrap(), 1);
        assert_eq!(search_directory(&mut reg, tmp.path(), DECLARATION_FILENAME, None).unwrap(), 0);
        assert_eq!(reg.candidates().len(), 1);
    }

    #[test]
    fn test_missing_root_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let mut reg = Registrar::new();
        let missing = tmp.path().join("nope");
        let added = search_directory(&mut reg, &missing, DECLARATION_FILENAME, None).unwrap();
        assert_eq!(added, 0);
    }

    #[test]
    fn test_unreadable_entry_skips_only_that_entry() {
        let tmp = TempDir::new().unwrap();
        add_package(tmp.path(), "A", r#"{"ModName": "PackA"}"#);
        add_package(tmp.path(), "B", r#"{"ModName": "PackB"}"#);

        let entries = vec![
            Ok(tmp.path().join("B")),
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")),
            Ok(tmp.path().join("A")),
        ];
        let dirs = select_package_dirs(tmp.path(), entries, DECLARATION_FILENAME);
        assert_eq!(dirs, vec![tmp.path().join("A"), tmp.path().join("B")]);
    }

    #[test]
    fn test_hidden_directories_skipped() {
        let tmp = TempDir::new().unwrap();
        add_package(tmp.path(), ".cache", r#"{"ModName": "Hidden"}"#);
        let mut reg = Registrar::new();
        search_directory(&mut reg, tmp.path(), DECLARATION_FILENAME, None).unwrap();
        assert!(reg.candidates().is_empty());
    }

    #[test]
    fn test_search_after_freeze_fails() {
        let tmp = TempDir::new().unwrap();
        let mut reg = Registrar::new();
        reg.freeze().unwrap();
        let err = search_directory(&mut reg, tmp.path(), DECLARATION_FILENAME, None).unwrap_err();
        assert!(matches!(err, DatamodError::InvalidState(_)));
    }
}
