//! npm registry API response types

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Abbreviated package document (`application/vnd.npm.install-v1+json`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Packument {
    /// Package name
    pub name: String,
    /// Distribution tags (`latest`, `next`, ...)
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,
    /// All published versions keyed by version string
    #[serde(default)]
    pub versions: HashMap<String, VersionManifest>,
}

/// Abbreviated manifest of one published version
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VersionManifest {
    /// Version string
    pub version: String,
}
