//! `.peercheck.toml` parsing
//!
//! Every field is optional so the same shape can describe any configuration
//! layer (global file, project file, environment, command line).

use camino::Utf8Path;
use peercheck_core::error::PeerCheckError;
use peercheck_core::types::PackageManager;
use serde::{Deserialize, Serialize};
use crate::{options::OrderBy, ConfigResult};

/// One configuration layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigLayer {
    /// Package manager used for install commands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<PackageManager>,

    /// Report ordering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,

    /// Registry base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,

    /// Package names to ignore
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore: Option<Vec<String>>,

    /// Only audit the root's direct dependencies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_only_on_root_dependencies: Option<bool>,

    /// Print satisfied edges too
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

/// Parse TOML string into a configuration layer
pub fn parse_config(content: &str, path: &str) -> ConfigResult<ConfigLayer> {
    ::toml::from_str(content).map_err(|e| PeerCheckError::TomlParse {
        path: path.to_string(),
        message: e.message().to_string(),
    })
}

/// Load a configuration layer from a file
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<ConfigLayer> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PeerCheckError::io(format!("Failed to read {}", path), e))?;

    parse_config(&content, path.as_str())
}
