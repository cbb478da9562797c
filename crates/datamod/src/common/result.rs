//! Common Result Type
//!
//! Type alias for pipeline results.

use super::error::DatamodError;

/// Pipeline result type
///
/// Only lifecycle misuse and collaborator setup failures travel through this;
/// per-package problems are logged and recorded on the package instead.
pub type DatamodResult<T> = Result<T, DatamodError>;
