//! The check and fix loop
//!
//! One pass gathers and reports every peer-dependency edge. With `install`
//! set, unmet edges are resolved, installed, and the tree is gathered again;
//! if the install surfaced new unmet edges the loop recurses, at most
//! [`MAX_INSTALL_PASSES`] install passes in total.

use std::future::Future;
use std::pin::Pin;

use peercheck_config::{CheckOptions, OrderBy};
use peercheck_core::types::{CommandLine, DependencyRecord, PackageManager, Resolution};
use peercheck_registry::VersionSource;
use tracing::{debug, info, warn};

use crate::commands::get_command_lines;
use crate::exec::CommandRunner;
use crate::gather::PeerDependencyGatherer;
use crate::solution::{conflicting_ranges, find_possible_resolutions};
use crate::ResolverResult;

/// Upper bound on install passes before giving up
pub const MAX_INSTALL_PASSES: u32 = 5;

/// Final state of a check run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Every peer dependency is met
    Satisfied,
    /// Unmet peer dependencies remain, or some have no solution
    Unresolved,
    /// Installs kept surfacing new unmet peer dependencies
    RecursionLimit,
}

impl CheckOutcome {
    /// Process exit code
    pub fn exit_code(&self) -> u8 {
        match self {
            CheckOutcome::Satisfied => 0,
            CheckOutcome::Unresolved => 1,
            CheckOutcome::RecursionLimit => 5,
        }
    }
}

/// Status of one reported edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Satisfied,
    /// Installed, at a version outside the range
    Unsatisfied,
    /// Not installed at all
    Missing,
    Yalc,
    Optional,
    Ignored,
}

/// One status line of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub kind: LineKind,
    pub text: String,
}

/// User-facing output sink
pub trait Reporter {
    fn line(&self, line: &ReportLine);
    fn info(&self, message: &str);
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    /// A command about to run, or one suggested to run
    fn command(&self, command: &CommandLine);
}

/// Drives gathering, reporting, resolution and installs
pub struct Checker<'a> {
    gatherer: &'a dyn PeerDependencyGatherer,
    versions: &'a dyn VersionSource,
    runner: &'a dyn CommandRunner,
    reporter: &'a dyn Reporter,
    package_manager: PackageManager,
    options: CheckOptions,
}

type PassFuture<'a> = Pin<Box<dyn Future<Output = ResolverResult<CheckOutcome>> + 'a>>;

impl<'a> Checker<'a> {
    pub fn new(
        gatherer: &'a dyn PeerDependencyGatherer,
        versions: &'a dyn VersionSource,
        runner: &'a dyn CommandRunner,
        reporter: &'a dyn Reporter,
        package_manager: PackageManager,
        options: CheckOptions,
    ) -> Self {
        Self {
            gatherer,
            versions,
            runner,
            reporter,
            package_manager,
            options,
        }
    }

    /// Run the check, installing fixes when `install` is set
    pub async fn run(&self) -> ResolverResult<CheckOutcome> {
        let records = self.gatherer.gather(&self.options)?;
        self.check_pass(records, 0).await
    }

    fn check_pass(&self, records: Vec<DependencyRecord>, depth: u32) -> PassFuture<'_> {
        Box::pin(async move {
            debug!("Check pass {} over {} peer dependencies", depth + 1, records.len());

            let records = sort_records(records, self.options.order_by);
            for line in report_lines(&records, &self.options) {
                self.reporter.line(&line);
            }

            let problems: Vec<DependencyRecord> = records.iter().filter(|r| r.is_problem()).cloned().collect();
            if problems.is_empty() {
                self.reporter.success("All peer dependencies are met");
                return Ok(CheckOutcome::Satisfied);
            }

            if self.options.install {
                self.install_pass(&problems, &records, depth).await
            } else if self.options.find_solutions {
                let resolutions = self.resolve(&problems, &records).await?;
                let commands = get_command_lines(self.package_manager, &resolutions);
                if !commands.is_empty() {
                    self.reporter.info("Install peerDependencies using these commands:");
                    for command in &commands {
                        self.reporter.command(command);
                    }
                }
                Ok(CheckOutcome::Unresolved)
            } else {
                self.reporter.info("Search for solutions with: peercheck --find-solutions");
                self.reporter.info("Install peerDependencies with: peercheck --install");
                Ok(CheckOutcome::Unresolved)
            }
        })
    }

    async fn install_pass(
        &self,
        problems: &[DependencyRecord],
        records: &[DependencyRecord],
        depth: u32,
    ) -> ResolverResult<CheckOutcome> {
        let resolutions = self.resolve(problems, records).await?;
        let commands = get_command_lines(self.package_manager, &resolutions);
        if commands.is_empty() {
            return Ok(CheckOutcome::Unresolved);
        }

        self.reporter.info("Installing peerDependencies...");
        for command in &commands {
            self.reporter.command(command);
            let status = self.runner.run(command).await?;
            if !status.success() {
                warn!("`{}` exited with status {:?}", command, status.code);
            }
        }

        let unsolvable: Vec<&DependencyRecord> = resolutions
            .iter()
            .filter(|resolution| !resolution.is_resolved())
            .map(|resolution| &resolution.problem)
            .collect();

        let after = self.gatherer.gather(&self.options)?;
        let new_problems = after
            .iter()
            .filter(|record| record.is_problem())
            .filter(|record| !unsolvable.iter().any(|known| known.is_same_edge(record)))
            .count();

        if new_problems == 0 {
            if unsolvable.is_empty() {
                self.reporter.success("All peer dependencies are met");
                return Ok(CheckOutcome::Satisfied);
            }
            return Ok(CheckOutcome::Unresolved);
        }

        info!("Install pass {} left {} unmet peer dependencies", depth + 1, new_problems);
        self.reporter
            .info(&format!("Found {} new unmet peerDependencies...", new_problems));

        if depth + 1 < MAX_INSTALL_PASSES {
            self.check_pass(after, depth + 1).await
        } else {
            self.reporter.error(&format!(
                "Giving up after {} install passes; peerDependencies are still unmet",
                MAX_INSTALL_PASSES
            ));
            Ok(CheckOutcome::RecursionLimit)
        }
    }

    /// Resolve problems and report the packages without a solution
    async fn resolve(
        &self,
        problems: &[DependencyRecord],
        records: &[DependencyRecord],
    ) -> ResolverResult<Vec<Resolution>> {
        self.reporter.info("Searching for solutions...");
        let root = self.gatherer.root_manifest()?;
        let resolutions = find_possible_resolutions(problems, records, self.versions, &root).await?;

        for resolution in resolutions.iter().filter(|r| !r.is_resolved()) {
            self.reporter.error(&format!(
                "Unable to find a version of {} that satisfies the following peerDependencies: {}",
                resolution.name(),
                conflicting_ranges(resolution.name(), records).join(" and ")
            ));
        }

        Ok(resolutions)
    }
}

/// Stable sort by `depender+name` or `name+depender`; `None` keeps input order
pub fn sort_records(mut records: Vec<DependencyRecord>, order_by: Option<OrderBy>) -> Vec<DependencyRecord> {
    match order_by {
        Some(OrderBy::Depender) => {
            records.sort_by_cached_key(|r| format!("{}{}", r.depender().name, r.name()))
        },
        Some(OrderBy::Dependee) => {
            records.sort_by_cached_key(|r| format!("{}{}", r.name(), r.depender().name))
        },
        None => {},
    }
    records
}

/// Lines to print for already sorted records.
///
/// Satisfied edges are shown in verbose mode or when the same package has an
/// unmet edge elsewhere; optional and ignored edges only in verbose mode.
pub fn report_lines(records: &[DependencyRecord], options: &CheckOptions) -> Vec<ReportLine> {
    let problem_names: Vec<&str> = records
        .iter()
        .filter(|r| r.is_problem())
        .map(DependencyRecord::name)
        .collect();

    records
        .iter()
        .filter_map(|record| {
            let kind = line_kind(record);
            let shown = match kind {
                LineKind::Unsatisfied | LineKind::Missing => true,
                LineKind::Satisfied | LineKind::Yalc => {
                    options.verbose || problem_names.contains(&record.name())
                },
                LineKind::Optional | LineKind::Ignored => options.verbose,
            };
            shown.then(|| ReportLine {
                kind,
                text: line_text(record, kind, options.order_by),
            })
        })
        .collect()
}

fn line_kind(record: &DependencyRecord) -> LineKind {
    if record.semver_satisfies() {
        LineKind::Satisfied
    } else if record.is_yalc() {
        LineKind::Yalc
    } else if record.is_ignored() {
        LineKind::Ignored
    } else if record.is_optional() {
        LineKind::Optional
    } else if record.installed_version().is_some() {
        LineKind::Unsatisfied
    } else {
        LineKind::Missing
    }
}

fn line_text(record: &DependencyRecord, kind: LineKind, order_by: Option<OrderBy>) -> String {
    let edge = match order_by {
        Some(OrderBy::Dependee) => format!(
            "{} {} is required by {}",
            record.name(),
            record.version(),
            record.depender()
        ),
        _ => format!("{} requires {} {}", record.depender(), record.name(), record.version()),
    };

    let installed = record.installed_version().unwrap_or_default();
    let status = match kind {
        LineKind::Satisfied | LineKind::Unsatisfied => format!("{} is installed", installed),
        LineKind::Missing => format!("{} is not installed", record.name()),
        LineKind::Yalc => format!("{} is installed via yalc", installed),
        LineKind::Ignored => "ignored".to_string(),
        LineKind::Optional if installed.is_empty() => "optional, not installed".to_string(),
        LineKind::Optional => format!("optional, {} is installed", installed),
    };

    format!("{} ({})", edge, status)
}
