//! npm registry client for peercheck
//!
//! This crate lists the published versions of a package from an npm registry,
//! with retry logic and an in-memory TTL cache, behind the [`VersionSource`]
//! trait the resolution engine consumes.

pub mod api;
pub mod cache;
pub mod client;

// Re-export main types
pub use api::{Packument, VersionManifest};
pub use cache::{CacheEntry, CacheStats, MetadataCache};
pub use client::{AuthConfig, RegistryClient, RetryConfig};

use async_trait::async_trait;
use peercheck_core::error::PeerCheckError;
use peercheck_core::types::Version;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, PeerCheckError>;

/// Source of published versions for a package name
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Every published version of `name`; empty when the package is unknown
    async fn available_versions(&self, name: &str) -> RegistryResult<Vec<Version>>;
}
