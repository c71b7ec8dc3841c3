//! Satisfaction classifier
//!
//! Turns gathered [`PeerRequirement`]s into [`DependencyRecord`]s by looking
//! up the installed version of each dependee. Lookups that fail simply mean
//! "not installed"; classification never aborts the batch.

use peercheck_config::CheckOptions;
use peercheck_core::types::{DependencyRecord, PeerRequirement};
use tracing::trace;

/// Source of installed versions
pub trait InstalledVersionLookup {
    /// Installed version of `requirement.name` as seen from its depender
    fn installed_version(&self, requirement: &PeerRequirement) -> Option<String>;
}

/// Classifies requirements against an installed tree
pub struct Classifier<'a> {
    lookup: &'a dyn InstalledVersionLookup,
    options: &'a CheckOptions,
}

impl<'a> Classifier<'a> {
    pub fn new(lookup: &'a dyn InstalledVersionLookup, options: &'a CheckOptions) -> Self {
        Self { lookup, options }
    }

    pub fn classify(&self, requirement: PeerRequirement) -> DependencyRecord {
        let installed = self.lookup.installed_version(&requirement);
        let is_ignored = self.options.is_ignored(&requirement.name);
        trace!(
            "{} requires {} {} (installed: {:?})",
            requirement.depender,
            requirement.name,
            requirement.range,
            installed
        );
        DependencyRecord::classify(requirement, installed, is_ignored)
    }

    pub fn classify_all(&self, requirements: impl IntoIterator<Item = PeerRequirement>) -> Vec<DependencyRecord> {
        requirements.into_iter().map(|req| self.classify(req)).collect()
    }
}
