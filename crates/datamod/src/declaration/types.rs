//! Declaration Types
//!
//! Rust structs matching the `datamod.json` declaration schema.

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::version::parse_version;

/// Standard filename of a package declaration
pub const DECLARATION_FILENAME: &str = "datamod.json";

/// Parsed package declaration
///
/// Immutable once loaded. Compared by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Declaration {
    /// Unique package identifier
    #[serde(rename = "ModName")]
    pub mod_name: String,
    #[serde(
        rename = "MinimumLavenderVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub minimum_host_version: Option<String>,
    #[serde(
        rename = "MaximumLavenderVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub maximum_host_version: Option<String>,

    // Player-facing metadata
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "URL")]
    pub url: String,

    // Content files, relative to the package directory
    #[serde(rename = "ItemFiles")]
    pub item_files: Vec<String>,
    #[serde(rename = "RecipeFiles")]
    pub recipe_files: Vec<String>,
    #[serde(
        rename = "LvAssetBundles",
        alias = "LavenderAssetBundleFiles",
        alias = "AssetBundles"
    )]
    pub asset_bundle_files: Vec<String>,
}

impl Declaration {
    /// Parsed minimum host version, if declared and well-formed
    pub fn minimum_version(&self) -> Option<Version> {
        self.minimum_host_version
            .as_deref()
            .and_then(|v| parse_version(v).ok())
    }

    /// Parsed maximum host version, if declared and well-formed
    pub fn maximum_version(&self) -> Option<Version> {
        self.maximum_host_version
            .as_deref()
            .and_then(|v| parse_version(v).ok())
    }

    /// Name shown in logs: the display name when set, otherwise the package name
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.mod_name
        } else {
            &self.name
        }
    }

    /// Total number of content files declared
    pub fn content_file_count(&self) -> usize {
        self.item_files.len() + self.recipe_files.len() + self.asset_bundle_files.len()
    }
}
