//! Command synthesizer
//!
//! Resolved packages are batched by [`ResolutionKind`] into one command per
//! non-empty batch, emitted Install, DevInstall, Upgrade.

use peercheck_core::types::{CommandLine, PackageManager, Resolution, ResolutionKind};

const KIND_ORDER: [ResolutionKind; 3] = [ResolutionKind::Install, ResolutionKind::DevInstall, ResolutionKind::Upgrade];

/// Install commands for every resolution that found a version
pub fn get_command_lines(package_manager: PackageManager, resolutions: &[Resolution]) -> Vec<CommandLine> {
    KIND_ORDER
        .iter()
        .filter_map(|kind| {
            let specs: Vec<String> = resolutions
                .iter()
                .filter(|resolution| resolution.kind == *kind)
                .filter_map(Resolution::install_spec)
                .collect();

            if specs.is_empty() {
                return None;
            }

            let mut args: Vec<String> = subcommand(package_manager, *kind)
                .iter()
                .map(|arg| arg.to_string())
                .collect();
            args.extend(specs);
            Some(CommandLine::new(package_manager.program(), args))
        })
        .collect()
}

fn subcommand(package_manager: PackageManager, kind: ResolutionKind) -> &'static [&'static str] {
    match (package_manager, kind) {
        (PackageManager::Npm, ResolutionKind::Install | ResolutionKind::Upgrade) => &["install"],
        (PackageManager::Npm, ResolutionKind::DevInstall) => &["install", "-D"],
        (PackageManager::Yarn, ResolutionKind::Install) => &["add"],
        (PackageManager::Yarn, ResolutionKind::DevInstall) => &["add", "-D"],
        (PackageManager::Yarn, ResolutionKind::Upgrade) => &["upgrade"],
        (PackageManager::Pnpm, ResolutionKind::Install) => &["add"],
        (PackageManager::Pnpm, ResolutionKind::DevInstall) => &["add", "-D"],
        (PackageManager::Pnpm, ResolutionKind::Upgrade) => &["update"],
    }
}
