//! Version selection against several independent ranges
//!
//! Every range is evaluated on its own and a candidate must satisfy all of
//! them. Stable releases win over prereleases whenever one fits.

use std::collections::BTreeSet;

use peercheck_core::types::{Version, VersionReq};

/// Version selector for finding best matching versions
#[derive(Debug, Clone)]
pub struct VersionSelector {
    /// Published versions, ascending
    available_versions: BTreeSet<Version>,
}

impl VersionSelector {
    /// Create new version selector with available versions
    pub fn new(versions: impl IntoIterator<Item = Version>) -> Self {
        Self {
            available_versions: versions.into_iter().collect(),
        }
    }

    /// Highest version matching all constraints, prereleases included
    pub fn select_best(&self, constraints: &[VersionReq]) -> Option<Version> {
        self.available_versions
            .iter()
            .rev()
            .find(|version| {
                constraints
                    .iter()
                    .all(|req| req.matches_including_prerelease(version))
            })
            .cloned()
    }

    /// Highest stable version (no prerelease) matching all constraints
    pub fn select_best_stable(&self, constraints: &[VersionReq]) -> Option<Version> {
        self.available_versions
            .iter()
            .rev()
            .filter(|version| !version.is_prerelease())
            .find(|version| constraints.iter().all(|req| req.matches(version)))
            .cloned()
    }

    /// Stable first, falling back to a prerelease if no stable version fits
    pub fn select_preferred(&self, constraints: &[VersionReq]) -> Option<Version> {
        self.select_best_stable(constraints)
            .or_else(|| self.select_best(constraints))
    }

    /// Number of candidate versions
    pub fn len(&self) -> usize {
        self.available_versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available_versions.is_empty()
    }
}
