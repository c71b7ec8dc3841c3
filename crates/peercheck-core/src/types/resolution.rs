//! Resolution outcome for one conflicting package.

use super::{DependencyRecord, Version};

/// How a resolved package should be installed into the root project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResolutionKind {
    /// Not declared by the root manifest yet
    Install,
    /// Declared in the root manifest's `devDependencies`
    DevInstall,
    /// Declared in the root manifest's `dependencies`
    Upgrade,
}

/// Answer to "can one version of this package satisfy everyone who requires it"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// First unsatisfied record seen for the package
    pub problem: DependencyRecord,
    /// Highest published version satisfying every declared range, if any
    pub resolution: Option<Version>,
    pub kind: ResolutionKind,
}

impl Resolution {
    pub fn name(&self) -> &str {
        self.problem.name()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// `name@version` install spec, if a version was found
    pub fn install_spec(&self) -> Option<String> {
        self.resolution
            .as_ref()
            .map(|version| format!("{}@{}", self.name(), version))
    }
}
