//! Configuration layering, fallback logic, and environment overrides

use std::collections::HashMap;
use camino::{Utf8Path, Utf8PathBuf};
use peercheck_core::error::PeerCheckError;
use peercheck_core::types::PackageManager;
use tracing::debug;
use crate::{file::ConfigLayer, options::CheckOptions, ConfigResult};

/// Project configuration file name
pub const PROJECT_CONFIG_FILE: &str = ".peercheck.toml";

/// Registry used when no layer names one
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
}

/// Configuration layering and merging
pub struct ConfigLayering;

/// Configuration source tracking
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Global config file
    Global(Utf8PathBuf),
    /// Project .peercheck.toml file
    Project(Utf8PathBuf),
    /// Environment variables
    Environment,
    /// CLI flags
    CommandLine,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub options: CheckOptions,
    pub package_manager: PackageManager,
    pub registry: String,
    /// Bearer token for the registry
    pub token: Option<String>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Find a configuration file in the project (walks up directory tree)
    pub fn resolve_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(filename))
            .find(|path| path.exists())
    }

    /// Load the nearest project configuration, if any
    pub async fn load_project_config(&self) -> ConfigResult<Option<(ConfigLayer, ConfigSource)>> {
        match self.resolve_config_path(PROJECT_CONFIG_FILE) {
            Some(path) => {
                debug!("Loading project config from {}", path);
                let layer = crate::file::load_from_file(&path).await?;
                Ok(Some((layer, ConfigSource::Project(path))))
            },
            None => Ok(None),
        }
    }

    /// Load global configuration from ~/.peercheck/config.toml
    pub async fn load_global_config(&self) -> ConfigResult<Option<(ConfigLayer, ConfigSource)>> {
        let Some(home_dir) = dirs::home_dir() else {
            return Ok(None);
        };

        let global_config_path = Utf8PathBuf::try_from(home_dir)
            .map_err(|e| PeerCheckError::ConfigValidation {
                field: "home_dir".to_string(),
                reason: format!("Invalid home directory path: {}", e),
            })?
            .join(".peercheck")
            .join("config.toml");

        if global_config_path.exists() {
            debug!("Loading global config from {}", global_config_path);
            let layer = crate::file::load_from_file(&global_config_path).await?;
            Ok(Some((layer, ConfigSource::Global(global_config_path))))
        } else {
            Ok(None)
        }
    }
}

impl ConfigLayering {
    /// Merge layers ordered from lowest to highest priority.
    ///
    /// Scalar fields take the highest layer that sets them; `ignore` lists are
    /// unioned in layer order.
    pub fn merge_layers(layers: impl IntoIterator<Item = ConfigLayer>) -> ConfigLayer {
        let mut merged = ConfigLayer::default();

        for layer in layers {
            merged.package_manager = layer.package_manager.or(merged.package_manager);
            merged.order_by = layer.order_by.or(merged.order_by);
            merged.registry = layer.registry.or(merged.registry);
            merged.run_only_on_root_dependencies = layer
                .run_only_on_root_dependencies
                .or(merged.run_only_on_root_dependencies);
            merged.verbose = layer.verbose.or(merged.verbose);

            if let Some(ignore) = layer.ignore {
                let combined = merged.ignore.get_or_insert_with(Vec::new);
                for name in ignore {
                    if !combined.contains(&name) {
                        combined.push(name);
                    }
                }
            }
        }

        merged
    }

    /// Snapshot the PEERCHECK_* and registry-related environment variables
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| {
                key.starts_with("PEERCHECK_") || key == "NPM_TOKEN" || key == "npm_config_registry"
            })
            .collect()
    }

    /// Build a layer from environment variables
    pub fn env_layer(env: &HashMap<String, String>) -> ConfigResult<ConfigLayer> {
        let mut layer = ConfigLayer::default();

        if let Some(value) = env.get("PEERCHECK_PACKAGE_MANAGER") {
            layer.package_manager = Some(value.parse().map_err(|reason| {
                PeerCheckError::ConfigValidation {
                    field: "PEERCHECK_PACKAGE_MANAGER".to_string(),
                    reason,
                }
            })?);
        }

        if let Some(value) = env.get("PEERCHECK_ORDER_BY") {
            layer.order_by = Some(value.parse().map_err(|reason| {
                PeerCheckError::ConfigValidation {
                    field: "PEERCHECK_ORDER_BY".to_string(),
                    reason,
                }
            })?);
        }

        layer.registry = env
            .get("PEERCHECK_REGISTRY")
            .or_else(|| env.get("npm_config_registry"))
            .cloned();

        if let Some(value) = env.get("PEERCHECK_IGNORE") {
            let names: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
            if !names.is_empty() {
                layer.ignore = Some(names);
            }
        }

        Ok(layer)
    }

    /// Turn the merged layer into settings, filling defaults.
    ///
    /// Without an explicit package manager the project's lockfile decides.
    pub fn resolve(
        merged: ConfigLayer,
        mut options: CheckOptions,
        project_root: &Utf8Path,
        env: &HashMap<String, String>,
    ) -> Settings {
        if let Some(order_by) = merged.order_by {
            options.order_by = Some(order_by);
        }
        options.verbose |= merged.verbose.unwrap_or(false);
        options.run_only_on_root_dependencies |= merged.run_only_on_root_dependencies.unwrap_or(false);
        for name in merged.ignore.unwrap_or_default() {
            if !options.ignore.contains(&name) {
                options.ignore.push(name);
            }
        }

        let package_manager = merged
            .package_manager
            .unwrap_or_else(|| detect_package_manager(project_root));

        let registry = merged
            .registry
            .unwrap_or_else(|| DEFAULT_REGISTRY.to_string())
            .trim_end_matches('/')
            .to_string();

        Settings {
            options,
            package_manager,
            registry,
            token: env.get("NPM_TOKEN").cloned(),
        }
    }
}

/// Pick the package manager from the lockfile present in the project root
pub fn detect_package_manager(project_root: &Utf8Path) -> PackageManager {
    if project_root.join("yarn.lock").exists() {
        PackageManager::Yarn
    } else if project_root.join("pnpm-lock.yaml").exists() {
        PackageManager::Pnpm
    } else {
        PackageManager::Npm
    }
}
