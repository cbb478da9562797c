//! Content Loading
//!
//! Feeds each accepted package's item, recipe and asset-bundle files to the
//! host's content registries.

pub mod json;
pub mod loader;

pub use json::{AssetData, AssetEntry, AssetKind, ContentEntry, JsonContentRegistry};
pub use loader::{load_accepted, load_package, ContentCounts};

use std::path::Path;

/// A host content registry.
///
/// Each method ingests one file on behalf of `owner` (the package name) and
/// returns how many entities it produced. Failures inside a file are the
/// registry's to report; they surface here as a zero count.
pub trait ContentRegistry {
    fn load_items_from_file(&mut self, path: &Path, owner: &str) -> usize;

    fn load_recipes_from_file(&mut self, path: &Path, owner: &str) -> usize;

    fn load_asset_bundle_from_file(&mut self, path: &Path, owner: &str) -> usize;
}
