//! Compatibility & Conflict Resolution
//!
//! Turns the frozen candidate pool into the accepted map in two stages:
//!
//! 1. Physical de-duplication by declaration path, then the host-version gate.
//! 2. Name-collision detection. Every record sharing a name is rejected; no
//!    collision is ever settled by picking one of the contenders.
//!
//! Records are processed in pool order, which only affects log order.

use std::collections::HashSet;

use indexmap::IndexMap;
use semver::Version;
use tracing::{debug, error};

use crate::record::{LoadingState, PackageRecord};
use crate::registrar::AcceptedMap;
use crate::version::{check_compatibility, Compatibility};

/// Result of resolving a candidate pool
#[derive(Debug, Default)]
pub struct Resolution {
    /// Conflict-free, version-compatible packages keyed by name
    pub accepted: AcceptedMap,
    /// Records that ended in an error state, in pool order per stage
    pub rejected: Vec<PackageRecord>,
    /// Records dropped because an earlier record had the same declaration path
    pub physical_duplicates: usize,
}

impl Resolution {
    /// Names that were rejected for colliding with another package
    pub fn conflicting_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .rejected
            .iter()
            .filter(|r| r.state() == LoadingState::ErrorDuplicateName)
            .map(PackageRecord::mod_name)
            .collect();
        names.dedup();
        names
    }
}

/// Resolve `candidates` against the running `host` version
pub fn resolve(candidates: Vec<PackageRecord>, host: &Version) -> Resolution {
    let mut resolution = Resolution::default();
    let survivors = gate_candidates(candidates, host, &mut resolution);
    detect_name_conflicts(survivors, &mut resolution);
    resolution
}

/// Stage A: drop physical duplicates, reject incompatible versions
fn gate_candidates(
    candidates: Vec<PackageRecord>,
    host: &Version,
    resolution: &mut Resolution,
) -> Vec<PackageRecord> {
    let mut seen_paths = HashSet::new();
    let mut survivors = Vec::with_capacity(candidates.len());

    for mut record in candidates {
        let path = record.declaration_path();
        if !seen_paths.insert(path.clone()) {
            debug!(
                "Package {} at {:?} was discovered more than once; ignoring repeat",
                record.mod_name(),
                path
            );
            resolution.physical_duplicates += 1;
            continue;
        }

        if record.is_errored() {
            debug!(
                "Package {} entered resolution already errored ({})",
                record.mod_name(),
                record.state()
            );
            resolution.rejected.push(record);
            continue;
        }

        match check_compatibility(record.declaration(), host) {
            Compatibility::Compatible => survivors.push(record),
            incompatible => {
                error!(
                    "Package {} {}. Not loading. Host version is {}",
                    record.mod_name(),
                    incompatible,
                    host
                );
                debug!("Disabled package {}", record.mod_name());
                record.set_state(LoadingState::ErrorIncompatibleVersion, false);
                resolution.rejected.push(record);
            }
        }
    }

    survivors
}

/// Stage B: accept unique names, reject every record of a shared name
fn detect_name_conflicts(survivors: Vec<PackageRecord>, resolution: &mut Resolution) {
    let mut by_name: IndexMap<String, Vec<PackageRecord>> = IndexMap::new();
    for record in survivors {
        by_name
            .entry(record.mod_name().to_string())
            .or_default()
            .push(record);
    }

    if by_name.values().any(|group| group.len() > 1) {
        error!("Found multiple packages using the same name; none of them will be loaded");
    }

    for (name, mut group) in by_name {
        if group.len() == 1 {
            if let Some(record) = group.pop() {
                resolution.accepted.insert(name, record);
            }
            continue;
        }

        error!(" Package name '{}' is used by {} packages:", name, group.len());
        for mut record in group {
            let declaration = record.declaration();
            error!(
                "  {:?} ({} ver {})",
                record.declaration_path(),
                declaration.display_name(),
                declaration.version
            );
            record.set_state(LoadingState::ErrorDuplicateName, false);
            resolution.rejected.push(record);
        }
    }
}
