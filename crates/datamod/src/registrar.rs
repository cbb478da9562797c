//! Package Registrar
//!
//! Owns the candidate pool, the search-root list and, once the pipeline is
//! done, the accepted map. Mutation is only allowed while discovery is open.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::common::{normalize_path, DatamodError, DatamodResult};
use crate::declaration::loader::validate;
use crate::record::PackageRecord;

/// Accepted packages keyed by package name, in discovery order
pub type AcceptedMap = IndexMap<String, PackageRecord>;

/// Lifecycle phase of a [`Registrar`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Search roots and candidates may be added
    Discovery,
    /// The pool is closed to additions and awaiting resolution
    Frozen,
    /// Resolution and loading finished; only the accepted map remains
    Complete,
}

#[derive(Debug)]
pub struct Registrar {
    phase: Phase,
    search_roots: Vec<PathBuf>,
    candidates: Vec<PackageRecord>,
    accepted: AcceptedMap,
}

impl Registrar {
    pub fn new() -> Self {
        Self {
            phase: Phase::Discovery,
            search_roots: Vec::new(),
            candidates: Vec::new(),
            accepted: IndexMap::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_discovery_open(&self) -> bool {
        self.phase == Phase::Discovery
    }

    pub(crate) fn ensure_discovery_open(&self, action: &'static str) -> DatamodResult<()> {
        if self.is_discovery_open() {
            Ok(())
        } else {
            Err(DatamodError::InvalidState(action))
        }
    }

    /// Add a search root. The path is normalised to an absolute path and
    /// added only if not already present. Returns whether it was added.
    pub fn add_search_root(&mut self, path: impl AsRef<Path>) -> DatamodResult<bool> {
        self.ensure_discovery_open("package discovery has finished; cannot add search roots")?;

        let path = normalize_path(path.as_ref())?;
        if self.search_roots.contains(&path) {
            return Ok(false);
        }
        debug!("Added search root {:?}", path);
        self.search_roots.push(path);
        Ok(true)
    }

    /// Add a candidate package. Returns whether it was added.
    ///
    /// The record's directory is normalised to an absolute path. A record
    /// with a blank name or an unparseable version bound is logged and
    /// refused. A record matching an existing candidate's directory,
    /// declaration filename and name is ignored.
    pub fn add_candidate(&mut self, mut record: PackageRecord) -> DatamodResult<bool> {
        self.ensure_discovery_open("package discovery has finished; cannot add candidates")?;

        if let Err(e) = validate(record.declaration(), &record.declaration_path()) {
            warn!("Refusing candidate: {}", e);
            return Ok(false);
        }
        record.normalize_directory()?;

        if self.candidates.iter().any(|c| c.is_same_candidate(&record)) {
            debug!(
                "Candidate {} at {:?} already registered",
                record.mod_name(),
                record.directory()
            );
            return Ok(false);
        }
        self.candidates.push(record);
        Ok(true)
    }

    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    pub fn candidates(&self) -> &[PackageRecord] {
        &self.candidates
    }

    /// Close discovery. Fails if already frozen or complete.
    pub(crate) fn freeze(&mut self) -> DatamodResult<()> {
        self.ensure_discovery_open("candidate pool is already frozen")?;
        self.phase = Phase::Frozen;
        Ok(())
    }

    /// Hand the frozen pool to the resolver
    pub(crate) fn take_candidates(&mut self) -> DatamodResult<Vec<PackageRecord>> {
        if self.phase != Phase::Frozen {
            return Err(DatamodError::InvalidState(
                "candidates can only be resolved from a frozen pool",
            ));
        }
        Ok(std::mem::take(&mut self.candidates))
    }

    /// Publish the accepted map and release the candidate pool
    pub(crate) fn complete(&mut self, accepted: AcceptedMap) {
        self.accepted = accepted;
        self.candidates = Vec::new();
        self.phase = Phase::Complete;
    }

    /// Whether the whole pipeline has finished
    pub fn is_loading_done(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// The accepted map, available only once loading is done
    pub fn accepted(&self) -> Option<&AcceptedMap> {
        self.is_loading_done().then_some(&self.accepted)
    }

    /// Look up an accepted package by name, once loading is done
    pub fn get(&self, mod_name: &str) -> Option<&PackageRecord> {
        self.accepted()?.get(mod_name)
    }
}

impl Default for Registrar {
    fn default() -> Self {
        Self::new()
    }
}
