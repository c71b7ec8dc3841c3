//! Semantic version and npm range types.
//!
//! `Version` follows semver 2.0 precedence. `VersionReq` implements the npm
//! range grammar used in `peerDependencies`: `||` alternatives, space-joined
//! comparators, hyphen ranges, x-ranges, tilde and caret.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Semantic version (major.minor.patch-prerelease+build)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build: Option<String>,
}

/// npm version range (`^16.8.0 || ^17.0.0`, `>=1.0.0 <2.0.0`, `1.x`)
///
/// A version matches the range when it matches every comparator of at least
/// one set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReq {
    raw: String,
    pub sets: Vec<ComparatorSet>,
}

/// Comparators joined by whitespace; all of them must match
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComparatorSet {
    pub comparators: Vec<Comparator>,
}

/// Individual version comparator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    pub op: Op,
    pub version: Version,
}

/// Comparison operator after range desugaring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Exact,     // =1.0.0
    Greater,   // >1.0.0
    GreaterEq, // >=1.0.0
    Less,      // <1.0.0
    LessEq,    // <=1.0.0
}

/// Partial version as written in a range (`1`, `1.2`, `1.x`, `*`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialVersion {
    pub major: Option<u64>,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub prerelease: Option<String>,
}

/// Version parsing and validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version format: {input}")]
    InvalidFormat { input: String },

    #[error("Invalid number in version: {component}")]
    InvalidNumber { component: String },

    #[error("Invalid prerelease identifier: {prerelease}")]
    InvalidPrerelease { prerelease: String },

    #[error("Invalid version range: {input}")]
    InvalidRange { input: String },
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    fn with_prerelease(major: u64, minor: u64, patch: u64, prerelease: Option<String>) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease,
            build: None,
        }
    }

    /// Lowest possible version of a release line, `M.m.p-0`
    fn lowest_of(major: u64, minor: u64, patch: u64) -> Self {
        Self::with_prerelease(major, minor, patch, Some("0".to_string()))
    }

    /// Check if this is a prerelease version
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Same major.minor.patch tuple, ignoring prerelease and build
    pub fn same_release(&self, other: &Self) -> bool {
        (self.major, self.minor, self.patch) == (other.major, other.minor, other.patch)
    }

    /// Get the precedence for comparison (ignores build metadata)
    fn precedence_cmp(&self, other: &Self) -> Ordering {
        match (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch)) {
            Ordering::Equal => match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => compare_prerelease(a, b),
            },
            other => other,
        }
    }
}

/// Compare dot-separated prerelease identifiers per semver 2.0 §11
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (parse_numeric(x), parse_numeric(y)) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            },
        }
    }
}

fn parse_numeric(component: &str) -> Option<u64> {
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    component.parse().ok()
}

fn parse_component(component: &str) -> Result<u64, VersionError> {
    parse_numeric(component).ok_or_else(|| VersionError::InvalidNumber {
        component: component.to_string(),
    })
}

fn validate_prerelease(prerelease: &str) -> Result<(), VersionError> {
    let valid = prerelease.split('.').all(|identifier| {
        !identifier.is_empty()
            && identifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    if valid {
        Ok(())
    } else {
        Err(VersionError::InvalidPrerelease {
            prerelease: prerelease.to_string(),
        })
    }
}

/// Strip the `v` / `=` prefixes npm tolerates in front of a version
fn strip_version_prefix(input: &str) -> &str {
    let input = input.trim_start_matches('=').trim();
    input.strip_prefix('v').unwrap_or(input)
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = strip_version_prefix(s.trim());

        // Split on '+' for build metadata
        let (version_part, build) = match input.split_once('+') {
            Some((v, b)) => (v, Some(b.to_string())),
            None => (input, None),
        };

        // Split on the first '-' for prerelease; later dashes belong to it
        let (core_part, prerelease) = match version_part.split_once('-') {
            Some((c, p)) => (c, Some(p.to_string())),
            None => (version_part, None),
        };

        if let Some(pre) = &prerelease {
            validate_prerelease(pre)?;
        }

        let parts: Vec<&str> = core_part.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::InvalidFormat {
                input: s.to_string(),
            });
        }

        Ok(Version {
            major: parse_component(parts[0])?,
            minor: parse_component(parts[1])?,
            patch: parse_component(parts[2])?,
            prerelease,
            build,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }

        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }

        Ok(())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_cmp(other)
    }
}

const OPERATORS: [&str; 8] = [">=", "<=", "~>", ">", "<", "=", "~", "^"];

/// Range operator as written, before desugaring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeOp {
    Caret,
    Tilde,
    Primitive(Op),
    Bare,
}

impl VersionReq {
    /// Parse an npm range string
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let sets = input
            .split("||")
            .map(ComparatorSet::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| match err {
                VersionError::InvalidRange { .. } => err,
                _ => VersionError::InvalidRange {
                    input: input.to_string(),
                },
            })?;

        Ok(VersionReq {
            raw: input.trim().to_string(),
            sets,
        })
    }

    /// Check if a version matches this requirement.
    ///
    /// Prerelease versions only match when a comparator in the same set names
    /// a prerelease of the same major.minor.patch, as npm does by default.
    pub fn matches(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| set.test(version, false))
    }

    /// Check if a version matches, treating prereleases like any other version
    pub fn matches_including_prerelease(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| set.test(version, true))
    }
}

impl FromStr for VersionReq {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl ComparatorSet {
    fn parse(input: &str) -> Result<Self, VersionError> {
        let tokens = tokenize(input)?;

        if tokens.len() == 3 && tokens[1] == "-" {
            let from = PartialVersion::parse(&tokens[0])?;
            let to = PartialVersion::parse(&tokens[2])?;
            let comparators = hyphen(&from, &to).ok_or_else(|| invalid_range(input))?;
            return Ok(Self { comparators });
        }

        let mut comparators = Vec::new();
        for token in &tokens {
            comparators.extend(parse_simple(token)?);
        }
        Ok(Self { comparators })
    }

    fn test(&self, version: &Version, include_prerelease: bool) -> bool {
        if !self.comparators.iter().all(|comp| comp.matches(version)) {
            return false;
        }

        if version.is_prerelease() && !include_prerelease {
            return self
                .comparators
                .iter()
                .any(|comp| comp.version.is_prerelease() && comp.version.same_release(version));
        }

        true
    }
}

/// Split a comparator set on whitespace, re-attaching detached operators
/// (`>= 1.2.3` becomes `>=1.2.3`)
fn tokenize(input: &str) -> Result<Vec<String>, VersionError> {
    let mut tokens = Vec::new();
    let mut pending: Option<&str> = None;

    for word in input.split_whitespace() {
        if OPERATORS.contains(&word) {
            if pending.is_some() {
                return Err(VersionError::InvalidRange {
                    input: input.to_string(),
                });
            }
            pending = Some(word);
            continue;
        }
        match pending.take() {
            Some(op) => tokens.push(format!("{}{}", op, word)),
            None => tokens.push(word.to_string()),
        }
    }

    if pending.is_some() {
        return Err(VersionError::InvalidRange {
            input: input.to_string(),
        });
    }

    Ok(tokens)
}

fn split_operator(token: &str) -> (RangeOp, &str) {
    for op in OPERATORS {
        if let Some(rest) = token.strip_prefix(op) {
            let range_op = match op {
                "^" => RangeOp::Caret,
                "~" | "~>" => RangeOp::Tilde,
                ">=" => RangeOp::Primitive(Op::GreaterEq),
                "<=" => RangeOp::Primitive(Op::LessEq),
                ">" => RangeOp::Primitive(Op::Greater),
                "<" => RangeOp::Primitive(Op::Less),
                _ => RangeOp::Primitive(Op::Exact),
            };
            return (range_op, rest);
        }
    }
    (RangeOp::Bare, token)
}

fn parse_simple(token: &str) -> Result<Vec<Comparator>, VersionError> {
    let (op, rest) = split_operator(token);
    let partial = PartialVersion::parse(rest)?;

    let comparators = match op {
        RangeOp::Caret => caret(&partial),
        RangeOp::Tilde => tilde(&partial),
        RangeOp::Primitive(Op::Exact) | RangeOp::Bare => x_range(&partial),
        RangeOp::Primitive(op) => primitive(op, &partial),
    };
    comparators.ok_or_else(|| invalid_range(token))
}

fn invalid_range(input: &str) -> VersionError {
    VersionError::InvalidRange {
        input: input.to_string(),
    }
}

fn comparator(op: Op, version: Version) -> Comparator {
    Comparator { op, version }
}

/// Set that no version can satisfy
fn nothing() -> Vec<Comparator> {
    vec![comparator(Op::Less, Version::lowest_of(0, 0, 0))]
}

// The desugaring helpers below return None when an upper bound would not
// fit in a u64.

fn x_range(partial: &PartialVersion) -> Option<Vec<Comparator>> {
    Some(match (partial.major, partial.minor, partial.patch) {
        (None, _, _) => Vec::new(),
        (Some(major), None, _) => vec![
            comparator(Op::GreaterEq, Version::new(major, 0, 0)),
            comparator(Op::Less, Version::lowest_of(major.checked_add(1)?, 0, 0)),
        ],
        (Some(major), Some(minor), None) => vec![
            comparator(Op::GreaterEq, Version::new(major, minor, 0)),
            comparator(Op::Less, Version::lowest_of(major, minor.checked_add(1)?, 0)),
        ],
        (Some(_), Some(_), Some(_)) => vec![comparator(Op::Exact, partial.to_version())],
    })
}

/// `~1.2.3` allows >=1.2.3 <1.3.0, `~1` allows >=1.0.0 <2.0.0
fn tilde(partial: &PartialVersion) -> Option<Vec<Comparator>> {
    Some(match (partial.major, partial.minor) {
        (None, _) => Vec::new(),
        (Some(major), None) => vec![
            comparator(Op::GreaterEq, Version::new(major, 0, 0)),
            comparator(Op::Less, Version::lowest_of(major.checked_add(1)?, 0, 0)),
        ],
        (Some(major), Some(minor)) => vec![
            comparator(Op::GreaterEq, partial.to_version()),
            comparator(Op::Less, Version::lowest_of(major, minor.checked_add(1)?, 0)),
        ],
    })
}

/// `^1.2.3` allows >=1.2.3 <2.0.0; on 0.x the leftmost non-zero part is locked
fn caret(partial: &PartialVersion) -> Option<Vec<Comparator>> {
    let upper = match (partial.major, partial.minor, partial.patch) {
        (None, _, _) => return Some(Vec::new()),
        (Some(major), None, _) => Version::lowest_of(major.checked_add(1)?, 0, 0),
        (Some(0), Some(minor), None) => Version::lowest_of(0, minor.checked_add(1)?, 0),
        (Some(major), Some(_), None) => Version::lowest_of(major.checked_add(1)?, 0, 0),
        (Some(0), Some(0), Some(patch)) => Version::lowest_of(0, 0, patch.checked_add(1)?),
        (Some(0), Some(minor), Some(_)) => Version::lowest_of(0, minor.checked_add(1)?, 0),
        (Some(major), Some(_), Some(_)) => Version::lowest_of(major.checked_add(1)?, 0, 0),
    };

    Some(vec![
        comparator(Op::GreaterEq, partial.to_version()),
        comparator(Op::Less, upper),
    ])
}

fn primitive(op: Op, partial: &PartialVersion) -> Option<Vec<Comparator>> {
    let (major, minor) = match (partial.major, partial.minor, partial.patch) {
        (Some(_), Some(_), Some(_)) => return Some(vec![comparator(op, partial.to_version())]),
        (None, _, _) => {
            return Some(match op {
                Op::Greater | Op::Less => nothing(),
                _ => Vec::new(),
            })
        },
        (Some(major), minor, _) => (major, minor),
    };

    let version = match (op, minor) {
        (Op::Greater, None) => comparator(Op::GreaterEq, Version::new(major.checked_add(1)?, 0, 0)),
        (Op::Greater, Some(minor)) => {
            comparator(Op::GreaterEq, Version::new(major, minor.checked_add(1)?, 0))
        },
        (Op::GreaterEq, _) => comparator(Op::GreaterEq, partial.to_version()),
        (Op::Less, _) => {
            comparator(Op::Less, Version::lowest_of(major, minor.unwrap_or(0), 0))
        },
        (Op::LessEq, None) => comparator(Op::Less, Version::lowest_of(major.checked_add(1)?, 0, 0)),
        (Op::LessEq, Some(minor)) => {
            comparator(Op::Less, Version::lowest_of(major, minor.checked_add(1)?, 0))
        },
        (Op::Exact, _) => return x_range(partial),
    };
    Some(vec![version])
}

/// `1.2.3 - 2.3` allows >=1.2.3 <2.4.0
fn hyphen(from: &PartialVersion, to: &PartialVersion) -> Option<Vec<Comparator>> {
    let mut comparators = Vec::new();

    if from.major.is_some() {
        comparators.push(comparator(Op::GreaterEq, from.to_version()));
    }

    match (to.major, to.minor, to.patch) {
        (None, _, _) => {},
        (Some(major), None, _) => {
            let upper = Version::lowest_of(major.checked_add(1)?, 0, 0);
            comparators.push(comparator(Op::Less, upper))
        },
        (Some(major), Some(minor), None) => {
            let upper = Version::lowest_of(major, minor.checked_add(1)?, 0);
            comparators.push(comparator(Op::Less, upper))
        },
        (Some(_), Some(_), Some(_)) => comparators.push(comparator(Op::LessEq, to.to_version())),
    }

    Some(comparators)
}

impl Comparator {
    /// Check if a version matches this comparator
    pub fn matches(&self, version: &Version) -> bool {
        match self.op {
            Op::Exact => version.cmp(&self.version) == Ordering::Equal,
            Op::Greater => version > &self.version,
            Op::GreaterEq => version >= &self.version,
            Op::Less => version < &self.version,
            Op::LessEq => version <= &self.version,
        }
    }
}

impl PartialVersion {
    /// Parse a possibly incomplete version (`1`, `1.2`, `1.2.x`, `*`)
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let input = strip_version_prefix(input.trim());
        if input.is_empty() {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let without_build = input.split_once('+').map_or(input, |(v, _)| v);
        let (core_part, prerelease) = match without_build.split_once('-') {
            Some((c, p)) => {
                validate_prerelease(p)?;
                (c, Some(p.to_string()))
            },
            None => (without_build, None),
        };

        let parts: Vec<&str> = core_part.split('.').collect();
        if parts.len() > 3 {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        // Once a component is a wildcard, everything after it is too
        let mut components = [None; 3];
        for (slot, part) in components.iter_mut().zip(parts.iter()) {
            if matches!(*part, "x" | "X" | "*") {
                break;
            }
            *slot = Some(parse_component(part)?);
        }

        let [major, minor, patch] = components;
        if prerelease.is_some() && patch.is_none() {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        Ok(Self {
            major,
            minor: major.and(minor),
            patch: major.and(minor).and(patch),
            prerelease,
        })
    }

    /// Convert to a full version (filling missing parts with 0)
    pub fn to_version(&self) -> Version {
        Version {
            major: self.major.unwrap_or(0),
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            prerelease: self.prerelease.clone(),
            build: None,
        }
    }
}
