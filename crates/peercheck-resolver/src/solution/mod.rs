//! Resolution engine
//!
//! For every distinct problem package, find one published version that
//! satisfies the ranges declared by all of its dependers. There is no
//! transitive lookahead: a resolution may introduce new peer requirements,
//! which the check loop discovers on its next pass.

use indexmap::{IndexMap, IndexSet};
use peercheck_config::PackageManifest;
use peercheck_core::types::{DependencyRecord, Resolution, ResolutionKind, VersionReq};
use peercheck_registry::VersionSource;
use tracing::{debug, warn};

use crate::semver::VersionSelector;
use crate::ResolverResult;

/// One resolution per distinct problem package name, in first-seen order
pub async fn find_possible_resolutions(
    problems: &[DependencyRecord],
    all_records: &[DependencyRecord],
    versions: &dyn VersionSource,
    root: &PackageManifest,
) -> ResolverResult<Vec<Resolution>> {
    let mut unique: IndexMap<&str, &DependencyRecord> = IndexMap::new();
    for problem in problems {
        unique.entry(problem.name()).or_insert(problem);
    }

    let mut resolutions = Vec::with_capacity(unique.len());
    for (name, problem) in unique {
        let ranges = conflicting_ranges(name, all_records);
        let published = versions.available_versions(name).await?;

        let resolution = match parse_ranges(name, &ranges) {
            Some(reqs) => VersionSelector::new(published).select_preferred(&reqs),
            None => None,
        };

        match &resolution {
            Some(version) => debug!("Resolved {} to {} for [{}]", name, version, ranges.join(", ")),
            None => debug!("No version of {} satisfies [{}]", name, ranges.join(", ")),
        }

        resolutions.push(Resolution {
            problem: problem.clone(),
            resolution,
            kind: resolution_kind(name, root),
        });
    }

    Ok(resolutions)
}

/// Distinct ranges declared for `name` by any depender, first-seen order
pub fn conflicting_ranges<'a>(name: &str, all_records: &'a [DependencyRecord]) -> Vec<&'a str> {
    all_records
        .iter()
        .filter(|record| record.name() == name)
        .map(|record| record.version())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// How `name` should be installed given where the root manifest declares it
pub fn resolution_kind(name: &str, root: &PackageManifest) -> ResolutionKind {
    if root.dependencies.contains_key(name) {
        ResolutionKind::Upgrade
    } else if root.dev_dependencies.contains_key(name) {
        ResolutionKind::DevInstall
    } else {
        ResolutionKind::Install
    }
}

/// A malformed range can never be satisfied, so it rules out a resolution
fn parse_ranges(name: &str, ranges: &[&str]) -> Option<Vec<VersionReq>> {
    ranges
        .iter()
        .map(|range| {
            VersionReq::parse(range)
                .map_err(|e| warn!("Ignoring unparsable range {} {:?}: {}", name, range, e))
                .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use peercheck_core::error::PeerCheckError;
    use peercheck_core::types::{Depender, PeerRequirement, Version};
    use peercheck_registry::RegistryResult;
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StaticVersions {
        versions: HashMap<String, Vec<Version>>,
        queried: Mutex<Vec<String>>,
    }

    impl StaticVersions {
        fn with(mut self, name: &str, versions: &[&str]) -> Self {
            self.versions.insert(
                name.to_string(),
                versions.iter().map(|v| Version::from_str(v).unwrap()).collect(),
            );
            self
        }
    }

    #[async_trait]
    impl VersionSource for StaticVersions {
        async fn available_versions(&self, name: &str) -> RegistryResult<Vec<Version>> {
            self.queried.lock().unwrap().push(name.to_string());
            Ok(self.versions.get(name).cloned().unwrap_or_default())
        }
    }

    struct FailingVersions;

    #[async_trait]
    impl VersionSource for FailingVersions {
        async fn available_versions(&self, _name: &str) -> RegistryResult<Vec<Version>> {
            Err(PeerCheckError::Network {
                message: "connection refused".to_string(),
                source: None,
            })
        }
    }

    fn record(name: &str, range: &str, depender: &str, installed: Option<&str>) -> DependencyRecord {
        let requirement = PeerRequirement::new(name, range, Depender::new(depender, "1.0.0", "/p/node_modules/x"));
        DependencyRecord::classify(requirement, installed.map(str::to_string), false)
    }

    fn problems(records: &[DependencyRecord]) -> Vec<DependencyRecord> {
        records.iter().filter(|r| r.is_problem()).cloned().collect()
    }

    #[tokio::test]
    async fn test_highest_version_satisfying_every_range() {
        let all = vec![
            record("react", ">=1.0.0", "a", None),
            record("react", "<2.0.0", "b", None),
        ];
        let source = StaticVersions::default().with("react", &["1.0.0", "1.5.0", "2.0.0"]);

        let resolutions = find_possible_resolutions(&problems(&all), &all, &source, &PackageManifest::default())
            .await
            .unwrap();

        assert_eq!(resolutions.len(), 1);
        assert_eq!(resolutions[0].resolution, Some(Version::new(1, 5, 0)));
        assert_eq!(resolutions[0].problem.depender().name, "a");
        assert_eq!(resolutions[0].install_spec().as_deref(), Some("react@1.5.0"));
    }

    #[tokio::test]
    async fn test_disjoint_ranges_have_no_solution() {
        let all = vec![
            record("react", ">=2.0.0", "a", None),
            record("react", "<1.0.0", "b", None),
            record("react", ">=2.0.0", "c", None),
        ];
        let source = StaticVersions::default().with("react", &["0.9.0", "1.0.0", "2.0.0"]);

        let resolutions = find_possible_resolutions(&problems(&all), &all, &source, &PackageManifest::default())
            .await
            .unwrap();

        assert_eq!(resolutions[0].resolution, None);
        assert_eq!(conflicting_ranges("react", &all).join(" and "), ">=2.0.0 and <1.0.0");
    }

    #[tokio::test]
    async fn test_ranges_come_from_all_dependers() {
        // Only "a" is failing, yet the satisfied edge from "b" still constrains the pick
        let all = vec![
            record("react", "^17.0.0", "a", Some("16.14.0")),
            record("react", ">=16.0.0 <17.0.3", "b", Some("16.14.0")),
        ];
        assert_eq!(problems(&all).len(), 1);
        let source = StaticVersions::default().with("react", &["16.14.0", "17.0.1", "17.0.2", "17.0.3"]);

        let resolutions = find_possible_resolutions(&problems(&all), &all, &source, &PackageManifest::default())
            .await
            .unwrap();

        assert_eq!(resolutions[0].resolution, Some(Version::new(17, 0, 2)));
    }

    #[tokio::test]
    async fn test_one_resolution_per_package_name() {
        let all = vec![
            record("react", "^17", "a", None),
            record("react", "^17.0.1", "b", None),
            record("redux", "^4", "a", None),
        ];
        let source = StaticVersions::default()
            .with("react", &["17.0.2"])
            .with("redux", &["4.2.1"]);

        let resolutions = find_possible_resolutions(&problems(&all), &all, &source, &PackageManifest::default())
            .await
            .unwrap();

        let names: Vec<&str> = resolutions.iter().map(Resolution::name).collect();
        assert_eq!(names, vec!["react", "redux"]);
        assert_eq!(*source.queried.lock().unwrap(), vec!["react", "redux"]);
    }

    #[tokio::test]
    async fn test_unpublished_package_has_no_solution() {
        let all = vec![record("ghost", "^1", "a", None)];
        let source = StaticVersions::default();

        let resolutions = find_possible_resolutions(&all, &all, &source, &PackageManifest::default())
            .await
            .unwrap();
        assert!(!resolutions[0].is_resolved());
    }

    #[tokio::test]
    async fn test_malformed_range_has_no_solution() {
        let all = vec![
            record("react", "^17", "a", None),
            record("react", "not-a-range!!", "b", None),
        ];
        let source = StaticVersions::default().with("react", &["17.0.2"]);

        let resolutions = find_possible_resolutions(&all, &all, &source, &PackageManifest::default())
            .await
            .unwrap();
        assert_eq!(resolutions[0].resolution, None);
    }

    #[tokio::test]
    async fn test_registry_failure_propagates() {
        let all = vec![record("react", "^17", "a", None)];

        let result = find_possible_resolutions(&all, &all, &FailingVersions, &PackageManifest::default()).await;
        assert!(matches!(result, Err(PeerCheckError::Network { .. })));
    }

    #[test]
    fn test_resolution_kind_follows_root_manifest() {
        let root: PackageManifest = serde_json::from_value(serde_json::json!({
            "dependencies": { "react": "^16" },
            "devDependencies": { "typescript": "^4" },
        }))
        .unwrap();

        assert_eq!(resolution_kind("react", &root), ResolutionKind::Upgrade);
        assert_eq!(resolution_kind("typescript", &root), ResolutionKind::DevInstall);
        assert_eq!(resolution_kind("redux", &root), ResolutionKind::Install);
    }
}
