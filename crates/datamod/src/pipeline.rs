//! Pipeline Orchestrator
//!
//! Runs discovery, resolution and content loading exactly once:
//!
//! 1. Skip everything when disabled by configuration.
//! 2. Run gather hooks, then search every registered search root.
//! 3. Freeze the candidate pool.
//! 4. Resolve the pool into the accepted map.
//! 5. Load content for accepted packages.
//! 6. Publish the accepted map and release the pool.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info};

use crate::common::{DatamodError, DatamodResult};
use crate::config::{PipelineConfig, Settings};
use crate::content::{load_accepted, ContentCounts, ContentRegistry};
use crate::handlers::HandlerRegistry;
use crate::record::{LoadingState, PackageRecord};
use crate::registrar::{AcceptedMap, Registrar};
use crate::resolver::{resolve, Resolution};
use crate::search::{search_directory, CandidateFilter};

/// Callback run just before the candidate pool freezes. This is the last
/// point at which search roots or candidates may be added.
pub type GatherHook = Box<dyn FnMut(&mut Registrar) -> DatamodResult<()>>;

/// What a call to [`Pipeline::run`] did
#[derive(Debug)]
pub enum RunOutcome {
    /// Disabled by configuration; nothing changed
    Disabled,
    /// The pipeline already ran in this context; nothing changed
    AlreadyProcessed,
    Completed(PipelineReport),
}

/// A package that did not make it into the accepted map
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedPackage {
    pub mod_name: String,
    pub declaration_path: PathBuf,
    pub state: LoadingState,
}

impl From<&PackageRecord> for RejectedPackage {
    fn from(record: &PackageRecord) -> Self {
        Self {
            mod_name: record.mod_name().to_string(),
            declaration_path: record.declaration_path(),
            state: record.state(),
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    /// Candidates in the pool when it froze
    pub candidates: usize,
    pub accepted: Vec<String>,
    pub rejected: Vec<RejectedPackage>,
    /// Names rejected because several packages declared them
    pub conflicting_names: Vec<String>,
    /// Repeat discoveries of an already pooled declaration file
    pub physical_duplicates: usize,
    pub content: ContentCounts,
}

pub struct Pipeline {
    config: PipelineConfig,
    registrar: Registrar,
    gather_hooks: HandlerRegistry<GatherHook>,
    processed: bool,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            registrar: Registrar::new(),
            gather_hooks: HandlerRegistry::new(),
            processed: false,
        }
    }

    /// Build a pipeline from settings, registering their search roots
    pub fn from_settings(settings: &Settings) -> DatamodResult<Self> {
        let mut pipeline = Self::new(settings.pipeline_config()?);
        for root in &settings.search_roots {
            pipeline.add_search_root(root)?;
        }
        Ok(pipeline)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registrar(&self) -> &Registrar {
        &self.registrar
    }

    pub fn add_search_root(&mut self, path: impl AsRef<Path>) -> DatamodResult<bool> {
        self.registrar.add_search_root(path)
    }

    pub fn add_candidate(&mut self, record: PackageRecord) -> DatamodResult<bool> {
        self.registrar.add_candidate(record)
    }

    /// Search `root` right away with an explicit filename and filter
    pub fn search_directory(
        &mut self,
        root: &Path,
        declaration_filename: &str,
        filter: Option<CandidateFilter<'_>>,
    ) -> DatamodResult<usize> {
        search_directory(&mut self.registrar, root, declaration_filename, filter)
    }

    /// Register a gather hook under `key`
    pub fn on_gather<F>(&mut self, key: impl Into<String>, hook: F) -> DatamodResult<()>
    where
        F: FnMut(&mut Registrar) -> DatamodResult<()> + 'static,
    {
        self.registrar
            .ensure_discovery_open("package discovery has finished; cannot add gather hooks")?;
        self.gather_hooks.register(key, Box::new(hook))
    }

    pub fn is_loading_done(&self) -> bool {
        self.registrar.is_loading_done()
    }

    /// The accepted map, available once a run has completed
    pub fn accepted(&self) -> Option<&AcceptedMap> {
        self.registrar.accepted()
    }

    /// Run the pipeline once. Later calls return [`RunOutcome::AlreadyProcessed`].
    pub fn run<R>(&mut self, content: &mut R) -> DatamodResult<RunOutcome>
    where
        R: ContentRegistry + ?Sized,
    {
        if self.processed {
            return Ok(RunOutcome::AlreadyProcessed);
        }

        if !self.config.enabled {
            info!("Loading of data-only packages disabled in settings. Skipping.");
            return Ok(RunOutcome::Disabled);
        }

        self.gather()?;

        let candidates = self.registrar.candidates().len();
        self.registrar.freeze()?;
        self.processed = true;

        let pool = self.registrar.take_candidates()?;
        let mut resolution = resolve(pool, &self.config.host_version);
        let conflicting_names = resolution
            .conflicting_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let content = load_accepted(&mut resolution.accepted, content);

        let Resolution {
            accepted,
            rejected,
            physical_duplicates,
        } = resolution;
        let report = PipelineReport {
            candidates,
            accepted: accepted.keys().cloned().collect(),
            rejected: rejected.iter().map(RejectedPackage::from).collect(),
            conflicting_names,
            physical_duplicates,
            content,
        };
        self.registrar.complete(accepted);

        info!(
            "Data-only packages done: {} found, {} loaded, {} rejected",
            report.candidates,
            report.accepted.len(),
            report.rejected.len()
        );
        Ok(RunOutcome::Completed(report))
    }

    /// Discovery: hooks first, then every registered search root
    fn gather(&mut self) -> DatamodResult<()> {
        for (key, hook) in self.gather_hooks.iter_mut() {
            if let Err(e) = hook(&mut self.registrar) {
                if matches!(e, DatamodError::InvalidState(_)) {
                    return Err(e);
                }
                error!("Gather hook '{}' failed: {}", key, e);
            }
        }

        let roots = self.registrar.search_roots().to_vec();
        let filename = self.config.declaration_filename.clone();
        for root in &roots {
            let added = search_directory(&mut self.registrar, root, &filename, None)?;
            info!("Found {} candidate packages in {:?}", added, root);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("registrar", &self.registrar)
            .field("gather_hooks", &self.gather_hooks)
            .field("processed", &self.processed)
            .finish()
    }
}
