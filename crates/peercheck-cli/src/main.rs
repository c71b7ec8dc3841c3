//! # peercheck-cli
//!
//! Audit npm peer dependencies and optionally install versions that satisfy them.
//!
//! This is the main entry point for the peercheck tool. It handles flag parsing,
//! sets up logging and error handling, and maps the check outcome to an exit code.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{ArgGroup, Parser};
use peercheck_config::OrderBy;
use peercheck_core::error::PeerCheckError;
use peercheck_core::types::PackageManager;
use peercheck_resolver::CheckOutcome;
use tracing::{debug, error};

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Check that the peer dependencies of installed packages are met
#[derive(Parser, Debug)]
#[command(name = "peercheck", version, about = "Audit and fix npm peer dependencies")]
#[command(group(ArgGroup::new("manager").args(["yarn", "pnpm", "npm"])))]
pub struct Cli {
    /// Use yarn for install commands
    #[arg(long)]
    pub yarn: bool,

    /// Use pnpm for install commands
    #[arg(long)]
    pub pnpm: bool,

    /// Use npm for install commands
    #[arg(long)]
    pub npm: bool,

    /// Install missing or incorrect peerDependencies
    #[arg(long)]
    pub install: bool,

    /// Search for versions satisfying every requirement and print the install commands
    #[arg(long, visible_alias = "findSolutions")]
    pub find_solutions: bool,

    /// Report ordering
    #[arg(long, value_name = "depender|dependee", visible_alias = "orderBy")]
    pub order_by: Option<OrderBy>,

    /// Also print satisfied, optional and ignored peerDependencies
    #[arg(short, long)]
    pub verbose: bool,

    /// Print debug logging
    #[arg(long)]
    pub debug: bool,

    /// Only check peerDependencies of the project's direct dependencies
    #[arg(long, visible_alias = "runOnlyOnRootDependencies")]
    pub run_only_on_root_dependencies: bool,

    /// Package name whose peer requirements never fail the check (repeatable)
    #[arg(long, value_name = "NAME")]
    pub ignore: Vec<String>,

    /// Registry base URL
    #[arg(long, value_name = "URL")]
    pub registry: Option<String>,

    /// Project directory (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<Utf8PathBuf>,
}

impl Cli {
    /// Package manager chosen by flag, if any
    pub fn package_manager(&self) -> Option<PackageManager> {
        if self.yarn {
            Some(PackageManager::Yarn)
        } else if self.pnpm {
            Some(PackageManager::Pnpm)
        } else if self.npm {
            Some(PackageManager::Npm)
        } else {
            None
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.debug);
    setup_panic_handler();

    debug!("Starting peercheck v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            let formatter = ErrorFormatter::new();
            match err.downcast_ref::<PeerCheckError>() {
                Some(err) => eprint!("{}", formatter.format_error(err)),
                None => eprintln!("{}", formatter.format_simple(&format!("{:#}", err))),
            }
            ExitCode::from(1)
        },
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<CheckOutcome> {
    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| PeerCheckError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = CommandContext::new(cli.cwd.clone())?;
        let outcome = commands::check::execute(&cli, &ctx).await?;
        Ok(outcome)
    })
}

fn setup_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("peercheck={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("peercheck encountered an unexpected error: {}", panic_info);
        eprintln!("peercheck crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/peercheck/peercheck/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
