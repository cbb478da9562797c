//! Discovery, validation and loading of data-only content packages.
//!
//! A package is a directory holding a `datamod.json` declaration plus the
//! item, recipe and asset-bundle files it lists. A [`Pipeline`] finds
//! packages under its search roots, rejects version-incompatible and
//! name-colliding ones, and feeds the survivors' content to a
//! [`ContentRegistry`], once.
//!
//! ```no_run
//! use datamod::{JsonContentRegistry, Pipeline, PipelineConfig, RunOutcome};
//!
//! # fn main() -> datamod::DatamodResult<()> {
//! let host = datamod::parse_version("1.2")?;
//! let mut pipeline = Pipeline::new(PipelineConfig::new(host));
//! pipeline.add_search_root("mods")?;
//!
//! let mut content = JsonContentRegistry::new();
//! if let RunOutcome::Completed(report) = pipeline.run(&mut content)? {
//!     println!("loaded {} packages", report.accepted.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod config;
pub mod content;
pub mod declaration;
pub mod handlers;
pub mod pipeline;
pub mod record;
pub mod registrar;
pub mod resolver;
pub mod search;
pub mod version;

pub use common::{DatamodError, DatamodResult};
pub use config::{PipelineConfig, Settings, DEFAULT_HOST_VERSION};
pub use content::{ContentCounts, ContentRegistry, JsonContentRegistry};
pub use declaration::{Declaration, DeclarationError, DECLARATION_FILENAME};
pub use handlers::HandlerRegistry;
pub use pipeline::{GatherHook, Pipeline, PipelineReport, RejectedPackage, RunOutcome};
pub use record::{LoadingState, PackageRecord};
pub use registrar::{AcceptedMap, Phase, Registrar};
pub use resolver::{resolve, Resolution};
pub use search::search_directory;
pub use version::{check_compatibility, parse_version, Compatibility};
