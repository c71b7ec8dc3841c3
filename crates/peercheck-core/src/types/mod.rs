//! Core data types for peer-dependency auditing.
//!
//! This module provides:
//! - Version and npm range types
//! - Peer requirement and dependency record types
//! - Resolutions and the install commands derived from them

pub mod command;
pub mod dependency;
pub mod resolution;
pub mod version;

// Re-export all public types
pub use command::{CommandLine, PackageManager};
pub use dependency::{is_yalc_version, satisfies_range, Depender, DependencyRecord, PeerRequirement};
pub use resolution::{Resolution, ResolutionKind};
pub use version::{Comparator, ComparatorSet, Op, PartialVersion, Version, VersionError, VersionReq};
