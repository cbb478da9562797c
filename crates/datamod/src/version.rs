//! Host Version Compatibility
//!
//! Declarations bound the host versions they work with. Versions are dotted
//! numbers; missing trailing components are zero, so `"1.2"` means `1.2.0`.
//! A fourth revision component is accepted and ignored: `"1.2.3.4"` means
//! `1.2.3`.

use std::fmt;

use semver::Version;

use crate::common::{DatamodError, DatamodResult};
use crate::declaration::Declaration;

/// Parse a dotted version of one to four components into three
pub fn parse_version(input: &str) -> DatamodResult<Version> {
    let trimmed = input.trim();
    let core_len = trimmed
        .find(|c: char| c == '-' || c == '+')
        .unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(core_len);

    let mut components: Vec<&str> = core.split('.').collect();
    if components.len() == 4 && components[3].parse::<u64>().is_ok() {
        components.pop();
    }
    while components.len() < 3 {
        components.push("0");
    }
    let mut padded = components.join(".");
    padded.push_str(suffix);

    Version::parse(&padded).map_err(|source| DatamodError::Version {
        input: input.to_string(),
        source,
    })
}

/// Outcome of checking a declaration against the running host version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    Compatible,
    /// The host is older than the declared minimum
    TooOld { minimum: Version },
    /// The host is newer than the declared maximum
    TooNew { maximum: Version },
}

impl Compatibility {
    pub fn is_compatible(&self) -> bool {
        matches!(self, Self::Compatible)
    }
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compatible => write!(f, "compatible"),
            Self::TooOld { minimum } => write!(f, "requires host version {} or newer", minimum),
            Self::TooNew { maximum } => {
                write!(f, "not compatible with host versions beyond {}", maximum)
            }
        }
    }
}

/// Check a declaration's version bounds against the host version.
///
/// Bounds are validated when the declaration is loaded; an unparseable bound
/// reaching this point is treated as absent.
pub fn check_compatibility(declaration: &Declaration, host: &Version) -> Compatibility {
    if let Some(minimum) = declaration.minimum_version() {
        if host < &minimum {
            return Compatibility::TooOld { minimum };
        }
    }

    if let Some(maximum) = declaration.maximum_version() {
        if host > &maximum {
            return Compatibility::TooNew { maximum };
        }
    }

    Compatibility::Compatible
}
