//! Content Loader
//!
//! Walks the declared file lists of every accepted, still-unloaded package.

use std::ops::AddAssign;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::ContentRegistry;
use crate::record::{LoadingState, PackageRecord};
use crate::registrar::AcceptedMap;

/// Entity tallies for one package or a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContentCounts {
    pub items: usize,
    pub recipes: usize,
    pub assets: usize,
    /// Asset-bundle files that produced at least one asset
    pub asset_bundle_files: usize,
}

impl AddAssign for ContentCounts {
    fn add_assign(&mut self, other: Self) {
        self.items += other.items;
        self.recipes += other.recipes;
        self.assets += other.assets;
        self.asset_bundle_files += other.asset_bundle_files;
    }
}

/// Load every accepted package still in `Unloaded`, in map order.
///
/// Returns the totals across all packages loaded by this call.
pub fn load_accepted<R: ContentRegistry + ?Sized>(
    accepted: &mut AcceptedMap,
    registry: &mut R,
) -> ContentCounts {
    let pending = accepted
        .values()
        .filter(|r| r.state() == LoadingState::Unloaded)
        .count();

    let mut totals = ContentCounts::default();
    if pending == 0 {
        return totals;
    }

    info!("Loading data-only packages (found {}):", pending);
    for record in accepted.values_mut() {
        if record.state() == LoadingState::Unloaded {
            totals += load_package(record, registry);
        }
    }
    totals
}

/// Load one package's content and mark it `Loaded`.
///
/// Missing files are logged and skipped; they never fail the package.
pub fn load_package<R: ContentRegistry + ?Sized>(
    record: &mut PackageRecord,
    registry: &mut R,
) -> ContentCounts {
    let declaration = record.declaration();
    info!(
        " Loading {} (v{})...",
        declaration.mod_name, declaration.version
    );

    let root = record.directory();
    let owner = record.mod_name();
    let mut counts = ContentCounts::default();

    for file in &declaration.item_files {
        let Some(path) = existing_file(root, file, owner, "item") else {
            continue;
        };
        let loaded = registry.load_items_from_file(&path, owner);
        report_file(loaded, file, root, "items");
        counts.items += loaded;
    }

    for file in &declaration.recipe_files {
        let Some(path) = existing_file(root, file, owner, "recipe") else {
            continue;
        };
        let loaded = registry.load_recipes_from_file(&path, owner);
        report_file(loaded, file, root, "recipes");
        counts.recipes += loaded;
    }

    for file in &declaration.asset_bundle_files {
        let Some(path) = existing_file(root, file, owner, "asset bundle") else {
            continue;
        };
        let loaded = registry.load_asset_bundle_from_file(&path, owner);
        if loaded > 0 {
            debug!("   Loaded {} assets from {}", loaded, file);
            counts.asset_bundle_files += 1;
            counts.assets += loaded;
        } else {
            warn!("   Asset bundle {} in package {:?} produced no assets", file, root);
        }
    }

    info!(
        "  Loaded {} items, {} recipes, {} assets in {} asset bundles.",
        counts.items, counts.recipes, counts.assets, counts.asset_bundle_files
    );

    record.set_state(LoadingState::Loaded, false);
    counts
}

fn existing_file(root: &Path, file: &str, owner: &str, kind: &str) -> Option<std::path::PathBuf> {
    let path = root.join(file);
    if path.is_file() {
        Some(path)
    } else {
        error!(
            "   Skipped {} file for package {} because it was missing: {:?}",
            kind, owner, path
        );
        None
    }
}

fn report_file(loaded: usize, file: &str, root: &Path, kind: &str) {
    if loaded > 0 {
        debug!("   Loaded {} {} from {}", loaded, kind, file);
    } else {
        error!(
            "   File {} in package {:?} has no {}; check it for format or syntax errors",
            file, root, kind
        );
    }
}
