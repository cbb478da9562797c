//! JSON Content Registry
//!
//! A [`ContentRegistry`] backed by plain JSON files. Items and recipes are
//! arrays of objects kept as opaque values; asset bundles are arrays of
//! typed asset descriptors.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use super::ContentRegistry;

/// An item or recipe definition owned by a package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentEntry {
    pub owner: String,
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    AssetBundle,
    Image,
    #[serde(rename = "OBJ")]
    Obj,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetData {
    #[serde(rename = "ResPath")]
    pub res_path: String,
    /// Only meaningful for asset bundles
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One asset descriptor from an asset-bundle file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "AssetType")]
    pub kind: AssetKind,
    #[serde(rename = "Data")]
    pub data: AssetData,
    /// Filled in from the owning package, not read from the file
    #[serde(skip_deserializing, default)]
    pub owner: String,
}

/// In-memory registry fed from JSON files
#[derive(Debug, Default)]
pub struct JsonContentRegistry {
    items: Vec<ContentEntry>,
    recipes: Vec<ContentEntry>,
    assets: Vec<AssetEntry>,
}

impl JsonContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ContentEntry] {
        &self.items
    }

    pub fn recipes(&self) -> &[ContentEntry] {
        &self.recipes
    }

    pub fn assets(&self) -> &[AssetEntry] {
        &self.assets
    }

    /// Entries of `entries` owned by `owner`
    pub fn owned_by<'a>(
        entries: &'a [ContentEntry],
        owner: &'a str,
    ) -> impl Iterator<Item = &'a ContentEntry> + 'a {
        entries.iter().filter(move |e| e.owner == owner)
    }
}

impl ContentRegistry for JsonContentRegistry {
    fn load_items_from_file(&mut self, path: &Path, owner: &str) -> usize {
        let Some(entries) = read_objects(path, owner) else {
            return 0;
        };
        let count = entries.len();
        self.items.extend(entries);
        count
    }

    fn load_recipes_from_file(&mut self, path: &Path, owner: &str) -> usize {
        let Some(entries) = read_objects(path, owner) else {
            return 0;
        };
        let count = entries.len();
        self.recipes.extend(entries);
        count
    }

    fn load_asset_bundle_from_file(&mut self, path: &Path, owner: &str) -> usize {
        let Some(content) = read_file(path) else {
            return 0;
        };
        let mut assets: Vec<AssetEntry> = match serde_json::from_str(&content) {
            Ok(assets) => assets,
            Err(e) => {
                error!("Failed to parse asset bundle {:?}: {}", path, e);
                return 0;
            }
        };
        for asset in &mut assets {
            asset.owner = owner.to_string();
        }
        let count = assets.len();
        self.assets.extend(assets);
        count
    }
}

fn read_file(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            error!("Failed to read {:?}: {}", path, e);
            None
        }
    }
}

/// Parse a JSON array, keeping only object entries
fn read_objects(path: &Path, owner: &str) -> Option<Vec<ContentEntry>> {
    let content = read_file(path)?;
    let values: Vec<Value> = match serde_json::from_str(&content) {
        Ok(values) => values,
        Err(e) => {
            error!("Failed to parse {:?}: {}", path, e);
            return None;
        }
    };

    let total = values.len();
    let entries: Vec<ContentEntry> = values
        .into_iter()
        .filter(Value::is_object)
        .map(|data| ContentEntry {
            owner: owner.to_string(),
            data,
        })
        .collect();

    if entries.len() < total {
        warn!(
            "Ignored {} non-object entries in {:?}",
            total - entries.len(),
            path
        );
    }
    Some(entries)
}
