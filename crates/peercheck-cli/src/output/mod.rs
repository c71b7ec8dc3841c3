//! Terminal output formatting.
//!
//! Report lines and command echoes go to stdout, errors to stderr.

pub mod colors;
pub mod errors;

use peercheck_core::types::CommandLine;
use peercheck_resolver::{LineKind, ReportLine, Reporter};

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: colors::ColorSupport,
}

impl OutputHandler {
    pub fn new() -> Self {
        Self {
            colors: colors::ColorSupport::detect(),
        }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self {
            colors: colors::ColorSupport::disabled(),
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}", message);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", self.colors.green("✓"), message);
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.colors.red("✗"), message);
    }

    /// Render one report line with its status marker
    pub fn format_line(&self, line: &ReportLine) -> String {
        let marker = match line.kind {
            LineKind::Satisfied => self.colors.green("✓"),
            LineKind::Unsatisfied | LineKind::Missing => self.colors.red("✗"),
            LineKind::Yalc => self.colors.yellow("☑"),
            LineKind::Optional | LineKind::Ignored => self.colors.dim("☑"),
        };
        format!("{}  {}", marker, line.text)
    }

    pub fn format_command(&self, command: &CommandLine) -> String {
        format!("{} {}", self.colors.dim("$"), self.colors.bold(&command.to_string()))
    }
}

impl Reporter for OutputHandler {
    fn line(&self, line: &ReportLine) {
        println!("{}", self.format_line(line));
    }

    fn info(&self, message: &str) {
        OutputHandler::info(self, message);
    }

    fn success(&self, message: &str) {
        OutputHandler::success(self, message);
    }

    fn error(&self, message: &str) {
        OutputHandler::error(self, message);
    }

    fn command(&self, command: &CommandLine) {
        println!("{}", self.format_command(command));
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
