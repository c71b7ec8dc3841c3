//! Peer-dependency edge types.
//!
//! A [`PeerRequirement`] is one `peerDependencies` entry as declared by a
//! depender. Classification against the installed tree turns it into a
//! [`DependencyRecord`], whose derived flags can only be computed, never set.

use super::{Version, VersionReq};
use camino::Utf8PathBuf;
use std::fmt;
use std::str::FromStr;

/// Package declaring a peer-dependency requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Depender {
    pub name: String,
    pub version: String,
    /// Directory the depender is installed in
    pub path: Utf8PathBuf,
}

/// One declared peer-dependency edge, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRequirement {
    /// Dependee package name
    pub name: String,
    /// Semver range string as written in the depender's manifest
    pub range: String,
    pub depender: Depender,
    /// Marked optional through `peerDependenciesMeta`
    pub optional: bool,
}

/// A peer-dependency edge annotated with its installed-version status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    requirement: PeerRequirement,
    installed_version: Option<String>,
    semver_satisfies: bool,
    is_yalc: bool,
    is_ignored: bool,
}

impl Depender {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for Depender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl PeerRequirement {
    /// Create a required (non-optional) peer requirement
    pub fn new(name: impl Into<String>, range: impl Into<String>, depender: Depender) -> Self {
        Self {
            name: name.into(),
            range: range.into(),
            depender,
            optional: false,
        }
    }

    /// Mark this requirement optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Same logical edge: equal dependee name, depender name and range
    pub fn is_same_edge(&self, other: &PeerRequirement) -> bool {
        self.name == other.name
            && self.depender.name == other.depender.name
            && self.range == other.range
    }
}

impl DependencyRecord {
    /// Classify a requirement against the version currently installed
    pub fn classify(
        requirement: PeerRequirement,
        installed_version: Option<String>,
        is_ignored: bool,
    ) -> Self {
        let semver_satisfies = installed_version
            .as_deref()
            .is_some_and(|installed| satisfies_range(installed, &requirement.range));
        let is_yalc = installed_version.as_deref().is_some_and(is_yalc_version);

        Self {
            requirement,
            installed_version,
            semver_satisfies,
            is_yalc,
            is_ignored,
        }
    }

    pub fn name(&self) -> &str {
        &self.requirement.name
    }

    /// The declared range string
    pub fn version(&self) -> &str {
        &self.requirement.range
    }

    pub fn depender(&self) -> &Depender {
        &self.requirement.depender
    }

    pub fn installed_version(&self) -> Option<&str> {
        self.installed_version.as_deref()
    }

    pub fn requirement(&self) -> &PeerRequirement {
        &self.requirement
    }

    pub fn semver_satisfies(&self) -> bool {
        self.semver_satisfies
    }

    pub fn is_yalc(&self) -> bool {
        self.is_yalc
    }

    pub fn is_optional(&self) -> bool {
        self.requirement.optional
    }

    pub fn is_ignored(&self) -> bool {
        self.is_ignored
    }

    /// Unsatisfied and not excused by yalc, `ignore` or `peerDependenciesMeta`
    pub fn is_problem(&self) -> bool {
        !self.semver_satisfies && !self.is_yalc && !self.is_ignored && !self.requirement.optional
    }

    pub fn is_same_edge(&self, other: &DependencyRecord) -> bool {
        self.requirement.is_same_edge(&other.requirement)
    }
}

/// Does `installed` satisfy `range`? Malformed input never satisfies.
pub fn satisfies_range(installed: &str, range: &str) -> bool {
    match (Version::from_str(installed), VersionReq::parse(range)) {
        (Ok(version), Ok(req)) => req.matches_including_prerelease(&version),
        _ => false,
    }
}

/// Versions published by `yalc` end in `-<hex digits>-yalc`
pub fn is_yalc_version(installed: &str) -> bool {
    let Some(rest) = installed.strip_suffix("-yalc") else {
        return false;
    };
    let Some((base, hash)) = rest.rsplit_once('-') else {
        return false;
    };
    !base.is_empty()
        && !hash.is_empty()
        && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
