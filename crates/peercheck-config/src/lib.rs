//! Manifest parsing and configuration for peercheck
//!
//! This crate reads the package.json fields relevant to peer dependencies and
//! layers `.peercheck.toml`, environment and command-line settings into the
//! options for one run.

pub mod file;
pub mod manifest;
pub mod merge;
pub mod options;

// Re-export main types
pub use file::ConfigLayer;
pub use manifest::{PackageManifest, PeerDependencyMeta};
pub use merge::{detect_package_manager, ConfigLayering, ConfigLoader, ConfigSource, Settings};
pub use options::{CheckOptions, OrderBy};

use peercheck_core::error::PeerCheckError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, PeerCheckError>;
