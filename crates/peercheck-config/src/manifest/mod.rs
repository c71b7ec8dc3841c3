//! package.json parsing
//!
//! Only the fields that matter for peer-dependency auditing are modelled.
//! Dependency maps keep declaration order so reports are reproducible.

use camino::Utf8Path;
use indexmap::IndexMap;
use peercheck_core::error::PeerCheckError;
use serde::{Deserialize, Serialize};
use crate::ConfigResult;

/// The subset of package.json read by peercheck
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package name (absent in some private root manifests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Package version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Runtime dependencies
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,

    /// Development dependencies
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: IndexMap<String, String>,

    /// Optional dependencies
    #[serde(default, rename = "optionalDependencies")]
    pub optional_dependencies: IndexMap<String, String>,

    /// Peer dependencies
    #[serde(default, rename = "peerDependencies")]
    pub peer_dependencies: IndexMap<String, String>,

    /// Per-peer metadata (`{"react": {"optional": true}}`)
    #[serde(default, rename = "peerDependenciesMeta")]
    pub peer_dependencies_meta: IndexMap<String, PeerDependencyMeta>,
}

/// Entry of `peerDependenciesMeta`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerDependencyMeta {
    #[serde(default)]
    pub optional: bool,
}

impl PackageManifest {
    /// Name for display, `<unnamed>` when the manifest has none
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Version for display, `0.0.0` when the manifest has none
    pub fn display_version(&self) -> &str {
        self.version.as_deref().unwrap_or("0.0.0")
    }

    /// Is the named peer dependency marked optional?
    pub fn is_optional_peer(&self, name: &str) -> bool {
        self.peer_dependencies_meta
            .get(name)
            .is_some_and(|meta| meta.optional)
    }
}

/// Parse JSON string to PackageManifest
pub fn parse_package_json(content: &str, path: &str) -> ConfigResult<PackageManifest> {
    serde_json::from_str(content).map_err(|e| PeerCheckError::JsonParse {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Load package.json from a file
pub fn load_from_file(path: &Utf8Path) -> ConfigResult<PackageManifest> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PeerCheckError::ManifestNotFound {
                path: path.to_string(),
            }
        } else {
            PeerCheckError::io(format!("Failed to read {}", path), e)
        }
    })?;

    parse_package_json(&content, path.as_str())
}
