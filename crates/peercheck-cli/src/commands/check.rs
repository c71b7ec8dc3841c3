//! The peer-dependency check.
//!
//! Builds layered settings, wires the registry client, gatherer and shell
//! runner into a [`Checker`] and runs it.

use std::collections::HashMap;

use camino::Utf8Path;
use peercheck_config::{CheckOptions, ConfigLayer, ConfigLayering, ConfigLoader, Settings};
use peercheck_core::error::PeerCheckResult;
use peercheck_registry::{AuthConfig, RegistryClient};
use peercheck_resolver::{CheckOutcome, Checker, NodeModulesGatherer, ShellRunner};
use tracing::{debug, info};

use super::CommandContext;
use crate::Cli;

/// Execute the check
pub async fn execute(cli: &Cli, ctx: &CommandContext) -> PeerCheckResult<CheckOutcome> {
    let settings = load_settings(cli, &ctx.cwd).await?;
    info!(
        "Checking {} with {} against {}",
        ctx.cwd, settings.package_manager, settings.registry
    );

    let registry = RegistryClient::with_registry(
        &settings.registry,
        AuthConfig {
            token: settings.token.clone(),
        },
    )?;
    let gatherer = NodeModulesGatherer::new(ctx.cwd.clone());
    let runner = ShellRunner::new(ctx.cwd.clone());

    Checker::new(
        &gatherer,
        &registry,
        &runner,
        &ctx.output,
        settings.package_manager,
        settings.options,
    )
    .run()
    .await
}

/// Resolve settings from config files, the process environment and flags
pub async fn load_settings(cli: &Cli, cwd: &Utf8Path) -> PeerCheckResult<Settings> {
    load_settings_with_env(cli, cwd, ConfigLayering::collect_env_overrides()).await
}

/// Resolve settings with an explicit environment snapshot
pub async fn load_settings_with_env(
    cli: &Cli,
    cwd: &Utf8Path,
    env: HashMap<String, String>,
) -> PeerCheckResult<Settings> {
    let loader = ConfigLoader::new(cwd.to_path_buf());
    let mut layers = Vec::new();

    let files = [loader.load_global_config().await?, loader.load_project_config().await?];
    for (layer, source) in files.into_iter().flatten() {
        debug!("Using config layer {:?}", source);
        layers.push(layer);
    }
    layers.push(ConfigLayering::env_layer(&env)?);
    layers.push(command_line_layer(cli));

    let merged = ConfigLayering::merge_layers(layers);
    Ok(ConfigLayering::resolve(merged, command_line_options(cli), cwd, &env))
}

/// Flags that take part in layering; unset flags leave lower layers alone
pub fn command_line_layer(cli: &Cli) -> ConfigLayer {
    ConfigLayer {
        package_manager: cli.package_manager(),
        order_by: cli.order_by,
        registry: cli.registry.clone(),
        ignore: (!cli.ignore.is_empty()).then(|| cli.ignore.clone()),
        run_only_on_root_dependencies: cli.run_only_on_root_dependencies.then_some(true),
        verbose: cli.verbose.then_some(true),
    }
}

/// Flags that only exist on the command line
fn command_line_options(cli: &Cli) -> CheckOptions {
    CheckOptions {
        debug: cli.debug,
        install: cli.install,
        find_solutions: cli.find_solutions,
        ..CheckOptions::default()
    }
}
