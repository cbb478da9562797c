//! Common Utilities
//!
//! Shared error types, the result alias, and path helpers used across the pipeline.

pub mod error;
pub mod paths;
pub mod result;

pub use error::DatamodError;
pub use paths::{datamod_dir, datamod_path, default_mods_dir, default_settings_path, normalize_path};
pub use result::DatamodResult;
