//! # peercheck-core
//!
//! Core types shared across all peercheck crates.
//!
//! This crate provides:
//! - Version and npm range (`VersionReq`) types
//! - Peer requirement, dependency record and resolution types
//! - PeerCheckError enum for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, DependencyRecord, etc.)
//! - `error`: Error types and result aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{PeerCheckError, PeerCheckResult};
pub use types::{
    CommandLine, Depender, DependencyRecord, PackageManager, PeerRequirement, Resolution,
    ResolutionKind, Version, VersionReq,
};
