//! Unit tests for the check command.

use super::check::{command_line_layer, execute, load_settings_with_env};
use super::*;
use crate::Cli;
use clap::Parser;
use peercheck_config::OrderBy;
use peercheck_core::types::PackageManager;
use peercheck_resolver::CheckOutcome;
use std::collections::HashMap;
use tempfile::TempDir;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("peercheck").chain(args.iter().copied())).unwrap()
}

fn project() -> (TempDir, Utf8PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, root)
}

fn write_package(dir: &camino::Utf8Path, manifest: serde_json::Value) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("package.json"), manifest.to_string()).unwrap();
}

fn test_context(root: &Utf8PathBuf) -> CommandContext {
    CommandContext {
        cwd: root.clone(),
        output: crate::output::OutputHandler::plain(),
    }
}

#[test]
fn test_parse_flags() {
    let cli = parse(&[
        "--yarn",
        "--install",
        "--order-by",
        "dependee",
        "--ignore",
        "react",
        "--ignore",
        "vue",
        "--cwd",
        "/tmp/app",
    ]);

    assert_eq!(cli.package_manager(), Some(PackageManager::Yarn));
    assert!(cli.install);
    assert_eq!(cli.order_by, Some(OrderBy::Dependee));
    assert_eq!(cli.ignore, vec!["react", "vue"]);
    assert_eq!(cli.cwd.as_deref().map(|p| p.as_str()), Some("/tmp/app"));
}

#[test]
fn test_camel_case_aliases() {
    let cli = parse(&["--findSolutions", "--orderBy", "depender", "--runOnlyOnRootDependencies"]);
    assert!(cli.find_solutions);
    assert_eq!(cli.order_by, Some(OrderBy::Depender));
    assert!(cli.run_only_on_root_dependencies);
}

#[test]
fn test_package_manager_flags_are_exclusive() {
    let result = Cli::try_parse_from(["peercheck", "--yarn", "--pnpm"]);
    assert!(result.is_err());
    assert_eq!(parse(&[]).package_manager(), None);
}

#[test]
fn test_invalid_order_by_is_rejected() {
    assert!(Cli::try_parse_from(["peercheck", "--order-by", "size"]).is_err());
}

#[test]
fn test_unset_flags_leave_layer_empty() {
    let layer = command_line_layer(&parse(&[]));
    assert_eq!(layer, peercheck_config::ConfigLayer::default());

    let layer = command_line_layer(&parse(&["--verbose", "--pnpm"]));
    assert_eq!(layer.verbose, Some(true));
    assert_eq!(layer.package_manager, Some(PackageManager::Pnpm));
}

#[tokio::test]
async fn test_flags_override_project_config() {
    let (_temp_dir, root) = project();
    std::fs::write(
        root.join(".peercheck.toml"),
        "package-manager = \"yarn\"\norder-by = \"dependee\"\nignore = [\"vue\"]\n",
    )
    .unwrap();

    let cli = parse(&["--pnpm", "--ignore", "react", "--install"]);
    let env = HashMap::from([("PEERCHECK_REGISTRY".to_string(), "https://npm.example.com/".to_string())]);
    let settings = load_settings_with_env(&cli, &root, env).await.unwrap();

    assert_eq!(settings.package_manager, PackageManager::Pnpm);
    assert_eq!(settings.options.order_by, Some(OrderBy::Dependee));
    assert!(settings.options.is_ignored("vue"));
    assert!(settings.options.is_ignored("react"));
    assert!(settings.options.install);
    assert_eq!(settings.registry, "https://npm.example.com");
}

#[tokio::test]
async fn test_lockfile_selects_package_manager() {
    let (_temp_dir, root) = project();
    std::fs::write(root.join("yarn.lock"), "").unwrap();

    let settings = load_settings_with_env(&parse(&[]), &root, HashMap::new()).await.unwrap();
    assert_eq!(settings.package_manager, PackageManager::Yarn);
}

#[tokio::test]
async fn test_execute_satisfied_project() {
    let (_temp_dir, root) = project();
    write_package(&root, serde_json::json!({ "name": "app", "dependencies": { "ui": "1", "react": "17" } }));
    write_package(
        &root.join("node_modules").join("ui"),
        serde_json::json!({ "name": "ui", "version": "1.0.0", "peerDependencies": { "react": "^17.0.0" } }),
    );
    write_package(
        &root.join("node_modules").join("react"),
        serde_json::json!({ "name": "react", "version": "17.0.2" }),
    );

    let cli = parse(&["--registry", "http://127.0.0.1:9"]);
    let outcome = execute(&cli, &test_context(&root)).await.unwrap();
    assert_eq!(outcome, CheckOutcome::Satisfied);
}

#[tokio::test]
async fn test_execute_reports_unmet_without_network() {
    let (_temp_dir, root) = project();
    write_package(&root, serde_json::json!({ "name": "app", "dependencies": { "ui": "1" } }));
    write_package(
        &root.join("node_modules").join("ui"),
        serde_json::json!({ "name": "ui", "version": "1.0.0", "peerDependencies": { "react": "^17.0.0" } }),
    );

    let cli = parse(&["--registry", "http://127.0.0.1:9"]);
    let outcome = execute(&cli, &test_context(&root)).await.unwrap();
    assert_eq!(outcome, CheckOutcome::Unresolved);
    assert_eq!(outcome.exit_code(), 1);
}

#[tokio::test]
async fn test_execute_without_package_json() {
    let (_temp_dir, root) = project();

    let err = execute(&parse(&[]), &test_context(&root)).await.unwrap_err();
    assert!(matches!(err, peercheck_core::error::PeerCheckError::ManifestNotFound { .. }));
}
