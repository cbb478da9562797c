//! Package Declarations
//!
//! Parses and validates the declaration file at the root of each package.

pub mod loader;
pub mod types;

pub use loader::{load_record, try_load_record, DeclarationError, MAX_DECLARATION_BYTES};
pub use types::{Declaration, DECLARATION_FILENAME};
