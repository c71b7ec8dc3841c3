//! Constraint gatherer
//!
//! Walks the installed `node_modules` tree the way node resolves packages and
//! collects every `peerDependencies` entry it finds along the way.

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use peercheck_config::manifest::{self, PackageManifest};
use peercheck_config::CheckOptions;
use peercheck_core::types::{DependencyRecord, Depender, PeerRequirement};
use tracing::{debug, warn};

use crate::classify::{Classifier, InstalledVersionLookup};
use crate::ResolverResult;

/// Produces classified peer-dependency records for a project
pub trait PeerDependencyGatherer {
    /// Gather and classify every peer requirement in the project tree
    fn gather(&self, options: &CheckOptions) -> ResolverResult<Vec<DependencyRecord>>;

    /// The project's own package.json, re-read on every call
    fn root_manifest(&self) -> ResolverResult<PackageManifest>;
}

/// Gatherer over an installed `node_modules` tree
#[derive(Debug, Clone)]
pub struct NodeModulesGatherer {
    project_root: Utf8PathBuf,
}

/// Installed-version lookup using node's resolution from the depender
#[derive(Debug, Clone)]
pub struct NodeModulesLookup {
    project_root: Utf8PathBuf,
}

/// Walk state shared by every visited package
struct Walk<'a> {
    options: &'a CheckOptions,
    visited: HashSet<Utf8PathBuf>,
    requirements: Vec<PeerRequirement>,
}

impl NodeModulesGatherer {
    pub fn new(project_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Unclassified requirements, deduplicated by edge in first-seen order
    pub fn collect_requirements(&self, options: &CheckOptions) -> ResolverResult<Vec<PeerRequirement>> {
        let root_manifest = self.root_manifest()?;

        let mut walk = Walk {
            options,
            visited: HashSet::from([self.project_root.clone()]),
            requirements: Vec::new(),
        };
        walk.visit(&self.project_root, &root_manifest, true);

        let mut seen = HashSet::new();
        let mut requirements = walk.requirements;
        requirements.retain(|req| seen.insert((req.name.clone(), req.depender.name.clone(), req.range.clone())));

        debug!(
            "Gathered {} peer requirements from {} packages",
            requirements.len(),
            walk.visited.len()
        );
        Ok(requirements)
    }
}

impl PeerDependencyGatherer for NodeModulesGatherer {
    fn gather(&self, options: &CheckOptions) -> ResolverResult<Vec<DependencyRecord>> {
        let requirements = self.collect_requirements(options)?;
        let lookup = NodeModulesLookup::new(self.project_root.clone());
        Ok(Classifier::new(&lookup, options).classify_all(requirements))
    }

    fn root_manifest(&self) -> ResolverResult<PackageManifest> {
        manifest::load_from_file(&self.project_root.join("package.json"))
    }
}

impl Walk<'_> {
    fn visit(&mut self, dir: &Utf8Path, package: &PackageManifest, is_root: bool) {
        debug!("Visiting {}", dir.join("package.json"));

        for (name, range) in &package.peer_dependencies {
            let depender = Depender::new(package.display_name(), package.display_version(), dir.to_path_buf());
            let mut requirement = PeerRequirement::new(name.as_str(), range.as_str(), depender);
            if package.is_optional_peer(name) {
                requirement = requirement.optional();
            }
            self.requirements.push(requirement);
        }

        let children: Vec<(&String, bool)> = if is_root {
            package
                .dev_dependencies
                .keys()
                .chain(package.dependencies.keys())
                .map(|name| (name, false))
                .collect()
        } else if self.options.run_only_on_root_dependencies {
            Vec::new()
        } else {
            package
                .dependencies
                .keys()
                .map(|name| (name, false))
                .chain(package.optional_dependencies.keys().map(|name| (name, true)))
                .collect()
        };

        for (name, optional) in children {
            let Some(child_dir) = resolve_package_dir(dir, name) else {
                if optional {
                    debug!("Optional dependency {} of {} is not installed", name, package.display_name());
                } else {
                    warn!("{} depends on {}, which is not installed", package.display_name(), name);
                }
                continue;
            };

            if !self.visited.insert(child_dir.clone()) {
                continue;
            }

            match manifest::load_from_file(&child_dir.join("package.json")) {
                Ok(child) => self.visit(&child_dir, &child, false),
                Err(e) => warn!("Skipping {}: {}", child_dir, e),
            }
        }
    }
}

impl NodeModulesLookup {
    pub fn new(project_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }
}

impl InstalledVersionLookup for NodeModulesLookup {
    fn installed_version(&self, requirement: &PeerRequirement) -> Option<String> {
        let dir = resolve_package_dir(&requirement.depender.path, &requirement.name)
            .or_else(|| resolve_package_dir(&self.project_root, &requirement.name))?;

        match manifest::load_from_file(&dir.join("package.json")) {
            Ok(package) => package.version,
            Err(e) => {
                debug!("Cannot read installed {}: {}", requirement.name, e);
                None
            },
        }
    }
}

/// Find the directory `name` resolves to from `from`, searching
/// `node_modules` in `from` and each ancestor like node does
pub fn resolve_package_dir(from: &Utf8Path, name: &str) -> Option<Utf8PathBuf> {
    from.ancestors()
        .filter(|dir| dir.file_name() != Some("node_modules"))
        .map(|dir| dir.join("node_modules").join(name))
        .find(|candidate| candidate.join("package.json").is_file())
}
