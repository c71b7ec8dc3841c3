//! Peer-dependency resolution engine for peercheck
//!
//! This crate gathers the peer requirements declared across an installed
//! `node_modules` tree, classifies them against what is installed, finds a
//! single version per conflicting package, and drives the bounded
//! install-and-recheck loop.

pub mod check;
pub mod classify;
pub mod commands;
pub mod exec;
pub mod gather;
pub mod semver;
pub mod solution;

// Re-export main types
pub use check::{CheckOutcome, Checker, LineKind, ReportLine, Reporter, MAX_INSTALL_PASSES};
pub use classify::{Classifier, InstalledVersionLookup};
pub use commands::get_command_lines;
pub use exec::{CommandRunner, CommandStatus, ShellRunner};
pub use gather::{resolve_package_dir, NodeModulesGatherer, NodeModulesLookup, PeerDependencyGatherer};
pub use semver::VersionSelector;
pub use solution::{conflicting_ranges, find_possible_resolutions, resolution_kind};

use peercheck_core::error::PeerCheckError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, PeerCheckError>;
